pub mod playback;

pub use playback::{MediaEvent, MediaEvents, MediaFactory, MediaHandle, FULL_VOLUME};
