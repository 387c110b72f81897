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

//! Types and traits shared by all API parts.

/// A string enumeration from the API.
///
/// Values outside of the known set map to `Unknown` instead of failing the
/// whole response.
macro_rules! protocol_enum {
    {$(#[$attr:meta])* enum $name:ident { $($item:ident = $val:literal),+ }} => (
        $(#[$attr])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $(
                #[allow(missing_docs)]
                $item,
            )+
            /// Value not known to this client.
            Unknown,
        }

        impl $name {
            /// String representation used by the API.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$item => $val,)+
                    $name::Unknown => "unknown",
                }
            }
        }

        impl<'de> ::serde::de::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> ::std::result::Result<$name, D::Error>
            where
                D: ::serde::de::Deserializer<'de>,
            {
                let value = <String as ::serde::de::Deserialize>::deserialize(deserializer)?;
                Ok(match value.as_str() {
                    $($val => $name::$item,)+
                    _ => $name::Unknown,
                })
            }
        }

        impl ::serde::ser::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> ::std::result::Result<S::Ok, S::Error>
            where
                S: ::serde::ser::Serializer,
            {
                serializer.serialize_str(self.as_str())
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    );
}

pub(crate) mod protocol;
mod resourceiterator;

pub(crate) use self::resourceiterator::{list_resources, ResourceCollection};
