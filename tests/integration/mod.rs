mod component_lifecycle;
mod import_pipeline;
mod support;
mod sync_pipeline;
