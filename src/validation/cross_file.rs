//! Per-pass view of the other workspace documents.
//!
//! The other documents are read and analyzed at most once per pass, on
//! first use, and schema/component member lists are memoized by owner.
//! A pass therefore costs one walk over the workspace no matter how many
//! instances or outputs it inspects.

use once_cell::unsync::OnceCell;
use rustc_hash::FxHashMap;
use smol_str::SmolStr;

use super::ValidationContext;
use crate::hir::{AnalyzedDocument, MemberInfo, OwnerKind, locate};
use crate::parser::SourceFile;

pub(crate) struct CrossFile<'a> {
    cx: ValidationContext<'a>,
    others: OnceCell<Vec<AnalyzedDocument>>,
    members: FxHashMap<(OwnerKind, SmolStr), Option<Vec<MemberInfo>>>,
}

impl<'a> CrossFile<'a> {
    pub(crate) fn new(cx: &ValidationContext<'a>) -> Self {
        Self {
            cx: *cx,
            others: OnceCell::new(),
            members: FxHashMap::default(),
        }
    }

    /// Members of the schema or component `owner`, current document first.
    pub(crate) fn members(&mut self, owner_kind: OwnerKind, owner: &str) -> Option<&[MemberInfo]> {
        let key = (owner_kind, SmolStr::new(owner));
        if !self.members.contains_key(&key) {
            let found = self.lookup(owner_kind, owner);
            if found.is_none() {
                tracing::trace!(owner, "owner not found in workspace");
            }
            self.members.insert(key.clone(), found);
        }
        self.members.get(&key).and_then(|found| found.as_deref())
    }

    fn lookup(&self, owner_kind: OwnerKind, owner: &str) -> Option<Vec<MemberInfo>> {
        let from = |tree: &SourceFile| match owner_kind {
            OwnerKind::Schema => locate::schema_properties(tree, owner),
            OwnerKind::Component => locate::component_members(tree, owner),
        };
        if let Some(found) = self.cx.document.tree().and_then(from) {
            return Some(found);
        }
        self.others().iter().filter_map(|doc| doc.tree()).find_map(from)
    }

    /// The current document followed by every other workspace document.
    pub(crate) fn documents(&self) -> impl Iterator<Item = &AnalyzedDocument> {
        std::iter::once(self.cx.document).chain(self.others())
    }

    fn others(&self) -> &[AnalyzedDocument] {
        self.others.get_or_init(|| {
            let workspace = self.cx.workspace();
            let others: Vec<AnalyzedDocument> = workspace
                .documents()
                .into_iter()
                .filter(|uri| *uri != self.cx.document.uri)
                .filter_map(|uri| workspace.read(&uri).map(|text| AnalyzedDocument::new(uri, text)))
                .collect();
            tracing::debug!(count = others.len(), "loaded workspace documents for validation");
            others
        })
    }
}
