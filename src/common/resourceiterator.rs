// Copyright 2026 Resalloc IBM Cloud tooling developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Generic pagination over collections.

use async_stream::try_stream;
use futures::Stream;
use log::trace;
use serde::de::DeserializeOwned;

use super::protocol::NextLink;
use crate::session::Session;
use crate::{Error, ErrorKind, Result};

/// A page of a collection as returned by the API.
pub(crate) trait ResourceCollection: DeserializeOwned {
    /// Type of items in the collection.
    type Item;

    /// Split the page into its items and the link to the next page.
    fn into_parts(self) -> (Vec<Self::Item>, Option<NextLink>);
}

/// Stream all items of a collection, following `next` links.
///
/// Note that no requests are done until you start polling.
pub(crate) fn list_resources<'s, C>(
    session: &'s Session,
    path: &'s [&'s str],
    limit: usize,
) -> impl Stream<Item = Result<C::Item>> + 's
where
    C: ResourceCollection + 's,
    C::Item: 's,
{
    try_stream! {
        let mut start: Option<String> = None;
        loop {
            let mut query = vec![("limit", limit.to_string())];
            if let Some(ref token) = start {
                query.push(("start", token.clone()));
            }

            trace!("Fetching a page of {:?} with {:?}", path, query);
            let page: C = session.get_json(path, &query).await?;
            let (items, next) = page.into_parts();
            for item in items {
                yield item;
            }

            match next {
                Some(link) => {
                    let token = link.start_token()?;
                    if start.as_deref() == Some(token.as_str()) {
                        Err::<(), Error>(Error::new(
                            ErrorKind::InvalidResponse,
                            format!("Next link {} repeats the current page", link.href),
                        ))?;
                    }
                    start = Some(token);
                }
                None => break,
            }
        }
    }
}
