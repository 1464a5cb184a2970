mod availability_service;
mod cache;

pub use availability_service::{
    AVAILABILITY_TTL, AvailabilityDependencies, FALLBACK_TTL, PollPolicy, SYSTEMIDS_TTL,
    availability_cache_key, check_availability, clean_isbns, resolve_systemids,
    systemids_cache_key,
};
