//! Notification domain module

mod kind;
mod options;

pub use kind::NotificationType;
pub use options::{
    default_images_dir, images_dir_from, parse_option_assignment, NotifyOptions, IMAGE_TOKENS,
    IMAGES_DIR_ENV,
};
