mod filters;
mod narrative;
pub(in crate::app) mod notification;
mod panels;
