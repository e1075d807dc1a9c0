// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use facetmap::{Facet, FacetHook, Reflect};

#[derive(Reflect, Debug, Clone)]
pub struct User {
    pub id: u64,
    pub email: String
}

#[derive(Facet, Debug)]
#[facet(source = "User")]
pub struct UserCard {
    pub id: u64,
    #[facet(skip)]
    pub avatar_url: String
}

struct AvatarHook;

#[async_trait]
impl FacetHook<User, UserCard> for AvatarHook {
    type Error = std::io::Error;

    async fn map(&self, source: &User, mut target: UserCard) -> Result<UserCard, Self::Error> {
        target.avatar_url = format!("https://avatars.example/{}", source.id);
        Ok(target)
    }
}

fn main() {
    let hook = AvatarHook;
    let _: &dyn FacetHook<User, UserCard, Error = std::io::Error> = &hook;
}
