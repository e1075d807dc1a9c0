// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

use chrono::{DateTime, Utc};
use facetmap::{Reflect, TypeRegistry, Value};

#[derive(Reflect, Debug, Clone, PartialEq)]
#[reflect(rename_all = "camelCase")]
pub struct Profile {
    pub display_name: String,
    pub age: Option<u32>,
    pub tags: Vec<String>,
    pub joined_at: DateTime<Utc>,
    #[reflect(skip)]
    pub cache: Vec<u8>
}

fn main() {
    let profile = Profile {
        display_name: "Ann".into(),
        age: Some(30),
        tags: vec!["admin".into()],
        joined_at: Utc::now(),
        cache: vec![1, 2, 3]
    };

    let value = <Profile as Reflect>::to_value(&profile);
    assert_eq!(value.get("displayName"), Some(Value::from("Ann")));
    assert_eq!(value.get("cache"), None);

    let back = <Profile as Reflect>::from_value(&value).unwrap();
    assert_eq!(back.display_name, "Ann");
    assert_eq!(back.joined_at, profile.joined_at);
    assert!(back.cache.is_empty());

    let mut registry = TypeRegistry::new();
    registry.register::<Profile>();
    assert!(registry.contains("Profile"));
}
