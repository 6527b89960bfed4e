use catalogue_core::{AppProvider, AppWithActions, BuildContext, Diagnostics};
use indexmap::IndexMap;
use std::sync::Arc;

use crate::adapter::PieceAdapter;
use crate::piece::Piece;

/// Exposes a set of named pieces as catalogue apps
#[derive(Default)]
pub struct PiecesProvider {
    pieces: IndexMap<String, Arc<dyn Piece>>,
}

impl PiecesProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a piece under its plugin identifier, e.g. `google-sheets`
    pub fn register(&mut self, name: impl Into<String>, piece: impl Piece + 'static) -> &mut Self {
        self.pieces.insert(name.into(), Arc::new(piece));
        self
    }

    pub fn with_piece(mut self, name: impl Into<String>, piece: impl Piece + 'static) -> Self {
        self.register(name, piece);
        self
    }

    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }
}

impl AppProvider for PiecesProvider {
    fn name(&self) -> &str {
        "pieces"
    }

    fn provide(&self, ctx: &BuildContext, diagnostics: &mut Diagnostics) -> Vec<AppWithActions> {
        let adapter = PieceAdapter::new(ctx.normalizer.clone());
        self.pieces
            .iter()
            .map(|(name, piece)| adapter.map_piece_to_app(name, piece.as_ref(), diagnostics))
            .collect()
    }
}
