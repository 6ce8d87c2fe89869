//! crud-dispatch: REST resources in a Redux-style store, mirrored into tables
//!
//! A [`DynamicStore`] keeps the records, loading flags and pagination of any
//! number of REST resources, keyed by [`ResourceKey`]. All changes go through
//! actions; requests run as tasks whose outcomes come back as `*Did*`
//! actions. A [`TableAdapter`] pushes those outcomes into a grid widget.
//!
//! # Example
//! ```ignore
//! use crud_dispatch::prelude::*;
//!
//! let (tx, mut notifications) = notify::channel();
//! let mut store = DynamicStore::new(HttpFetch::new(&HttpConfig::default())?, tx);
//! let mut table = TableAdapter::<DataGrid>::new();
//!
//! store.register_route("api/users")?;
//! let users = store.state().require_main()?.clone();
//! table.initialize(area, &store.state().columns(), vec![], GridOptions::default());
//! store.paginate(1)?;
//!
//! while let Some(action) = store.process_next().await {
//!     table.mirror(&users, &action)?;
//! }
//! ```

// Re-export everything from core
pub use crud_dispatch_core::*;

/// Table adapter, grid widget and components
pub mod grid {
    pub use crud_dispatch_grid::*;
}

pub use crud_dispatch_grid::{
    Component, DataGrid, DataGridProps, EventKind, GridOptions, GridWidget, TableAdapter,
    TableError,
};

/// Prelude for convenient imports
pub mod prelude {
    // Store
    pub use crud_dispatch_core::prelude::*;

    // Grid
    pub use crud_dispatch_grid::prelude::*;
    pub use crud_dispatch_grid::{GridColumn, GridLayout, PaginationMode};
}
