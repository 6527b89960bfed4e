//! Pieces adapter: turns third-party pieces plugins into catalogue apps.
//!
//! Pieces describe their inputs with a property system of their own. Value
//! props become options, dropdowns become allowed values (static or fetched),
//! and dynamic props are folded into the dependent-options resolver of the
//! props they refresh on.

pub mod adapter;
pub mod error;
pub mod piece;
pub mod property;
pub mod provider;

pub use adapter::{map_piece_action_to_app_action, map_piece_to_app, PieceAdapter};
pub use error::{PieceError, PieceResult};
pub use piece::{
    piece_auth, ActionDef, OAuth2Auth, Piece, PieceAction, PieceAuth, PieceContext, PieceDef,
};
pub use property::{
    DropdownOption, DropdownState, DynamicPropsFetcher, FetchContext, Fetcher, OptionsFetcher,
    Property, PropertyKind,
};
pub use provider::PiecesProvider;
