// Delivery protocols consumed by the HTTP layer

mod delivery;

pub use delivery::{max_playlist_attempts, split_segment_path, HlsDeliveryApi, PLAYLIST_POLL_INTERVAL};
