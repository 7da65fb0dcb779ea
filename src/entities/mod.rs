//! Registry for the four tracked record types: route slug and table name
//! mapping, parent relations, and the field schemas the validation layer
//! enforces.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Entity {
    CryptoMarket,
    CryptoNews,
    CryptoPortfolio,
    CryptoWatchlist,
}

pub const ALL_ENTITIES: [Entity; 4] =
    [Entity::CryptoMarket, Entity::CryptoNews, Entity::CryptoPortfolio, Entity::CryptoWatchlist];

/// A belongs-to relation that can be hydrated into a record when the request
/// names it in `relations`.
#[derive(Debug, Clone, Copy)]
pub struct Relation {
    pub name: &'static str,
    pub table: &'static str,
    pub foreign_key: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Integer,
    Timestamp,
    Uuid,
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

impl Entity {
    /// Resolve a URL route slug (`crypto-markets`) to its entity.
    pub fn from_route(slug: &str) -> Option<Self> {
        match slug {
            "crypto-markets" => Some(Entity::CryptoMarket),
            "crypto-news" => Some(Entity::CryptoNews),
            "crypto-portfolios" => Some(Entity::CryptoPortfolio),
            "crypto-watchlists" => Some(Entity::CryptoWatchlist),
            _ => None,
        }
    }

    pub fn route(&self) -> &'static str {
        match self {
            Entity::CryptoMarket => "crypto-markets",
            Entity::CryptoNews => "crypto-news",
            Entity::CryptoPortfolio => "crypto-portfolios",
            Entity::CryptoWatchlist => "crypto-watchlists",
        }
    }

    pub fn table(&self) -> &'static str {
        match self {
            Entity::CryptoMarket => "crypto_market",
            Entity::CryptoNews => "crypto_news",
            Entity::CryptoPortfolio => "crypto_portfolio",
            Entity::CryptoWatchlist => "crypto_watchlist",
        }
    }

    pub fn relations(&self) -> &'static [Relation] {
        match self {
            Entity::CryptoMarket => &[Relation { name: "user", table: "user", foreign_key: "user_id" }],
            Entity::CryptoNews => &[Relation { name: "user", table: "user", foreign_key: "user_id" }],
            Entity::CryptoPortfolio => &[
                Relation { name: "crypto_market", table: "crypto_market", foreign_key: "crypto_id" },
                Relation { name: "user", table: "user", foreign_key: "user_id" },
            ],
            Entity::CryptoWatchlist => &[
                Relation { name: "crypto_market", table: "crypto_market", foreign_key: "crypto_id" },
                Relation { name: "user", table: "user", foreign_key: "user_id" },
            ],
        }
    }

    pub fn fields(&self) -> &'static [FieldSpec] {
        match self {
            Entity::CryptoMarket => &[
                FieldSpec { name: "name", kind: FieldKind::Text, required: true },
                FieldSpec { name: "symbol", kind: FieldKind::Text, required: true },
                FieldSpec { name: "current_price", kind: FieldKind::Integer, required: true },
                FieldSpec { name: "market_cap", kind: FieldKind::Integer, required: true },
                FieldSpec { name: "volume", kind: FieldKind::Integer, required: true },
                FieldSpec { name: "user_id", kind: FieldKind::Uuid, required: true },
            ],
            Entity::CryptoNews => &[
                FieldSpec { name: "title", kind: FieldKind::Text, required: true },
                FieldSpec { name: "content", kind: FieldKind::Text, required: true },
                FieldSpec { name: "published_at", kind: FieldKind::Timestamp, required: true },
                FieldSpec { name: "source", kind: FieldKind::Text, required: true },
                FieldSpec { name: "author", kind: FieldKind::Text, required: true },
                FieldSpec { name: "user_id", kind: FieldKind::Uuid, required: true },
            ],
            Entity::CryptoPortfolio => &[
                FieldSpec { name: "amount", kind: FieldKind::Integer, required: true },
                FieldSpec { name: "purchase_price", kind: FieldKind::Integer, required: true },
                FieldSpec { name: "purchase_date", kind: FieldKind::Timestamp, required: true },
                FieldSpec { name: "crypto_id", kind: FieldKind::Uuid, required: true },
                FieldSpec { name: "user_id", kind: FieldKind::Uuid, required: true },
            ],
            Entity::CryptoWatchlist => &[
                FieldSpec { name: "crypto_id", kind: FieldKind::Uuid, required: true },
                FieldSpec { name: "user_id", kind: FieldKind::Uuid, required: true },
            ],
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table())
    }
}
