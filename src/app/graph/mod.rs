pub(in crate::app) mod interaction;
mod view;
