// Domain layer: content schema, form schema and ports (interfaces) to the
// page engine, storage and mail. No I/O happens here.

pub mod blocks;
pub mod forms;
pub mod model;
pub mod pages;
pub mod panels;
pub mod ports;
pub mod relations;
