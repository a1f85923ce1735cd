// Application layer: presentation of predictions and insights for the CLI front end.

pub mod presenter;
