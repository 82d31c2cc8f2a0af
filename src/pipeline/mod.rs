pub(crate) mod orchestrator;
pub(crate) mod workspace;
