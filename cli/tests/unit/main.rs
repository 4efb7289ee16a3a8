//! Handler tests driven through in-memory adapters

mod support;

mod test_device_backups;
mod test_lifecycle;
mod test_settings;
