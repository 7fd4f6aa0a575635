//! Depot: where `select_all` deposits reconstructed entities.

use crate::persist::Record;

/// A caller-supplied sink for reconstructed entities.
///
/// [`Transactor::select_all`] invokes [`Depot::store`] exactly once per
/// principal row, after the entity's relation containers have been
/// repopulated, in referenced-before-referencer type order.
///
/// [`Transactor::select_all`]: crate::Transactor::select_all
pub trait Depot {
    /// Receives one reconstructed entity.
    ///
    /// `type_name` is the registered [`EntitySchema::type_name`], letting
    /// heterogeneous depots dispatch without downcasting every record.
    ///
    /// [`EntitySchema::type_name`]: crate::EntitySchema::type_name
    fn store(&mut self, type_name: &'static str, record: Box<dyn Record>);
}

impl<F: FnMut(&'static str, Box<dyn Record>)> Depot for F {
    fn store(&mut self, type_name: &'static str, record: Box<dyn Record>) {
        self(type_name, record);
    }
}
