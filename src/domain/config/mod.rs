//! Configuration domain module

mod app_config;

pub use app_config::{
    parse_flag, BackendSetting, NotifierConfig, Switch, DEFAULT_NAMESPACE, ENV_PREFIX,
};
