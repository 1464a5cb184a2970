mod recommendation_service;

pub use recommendation_service::{
    DEFAULT_LIMIT, PRIMARY_LIMIT, REASON, Recommendation, RecommendationDependencies,
    SECONDARY_LIMIT, merge_candidates, recommend,
};
