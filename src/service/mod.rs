//! CrudService: resource operations on top of a document store.

mod crud;
pub use crud::CrudService;
