//! `figment` integration: exposes declared defaults as the lowest layer.

use figment::{
    Error, Metadata, Profile, Provider,
    value::{Dict, Map, Value},
};

use super::ConfigKeyRegistry;

impl Provider for ConfigKeyRegistry {
    fn metadata(&self) -> Metadata {
        Metadata::named("registered config key defaults")
    }

    fn data(&self) -> Result<Map<Profile, Dict>, Error> {
        let mut dict = Dict::new();
        for (name, key) in self.iter() {
            dict.insert(name.to_owned(), Value::serialize(&key.default)?);
        }
        Ok(Profile::Default.collect(dict))
    }
}
