mod filters;
mod model;
mod sample;
mod source;

pub use filters::{
    FilterOptions, FilterSelection, FilterState, FilterVisibility, Role, visible_filters,
};
pub use model::{Cluster, ClusterId, Dataset, Question, question_node_ids};
pub use sample::sample_dataset;
pub use source::{ApiClient, DataSource, FetchError, LoadedData, load_with_fallback};
