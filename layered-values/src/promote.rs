//! Projection of value mentions into document values.

use layered_resolution::{DocTheory, ValueMention};

/// Give every sentence-level and document-level value mention a document
/// [`Value`](layered_resolution::Value). Mentions already promoted are kept.
///
/// Returns the number of new values.
pub fn promote_values(doc: &mut DocTheory) -> usize {
    let pending: Vec<(ValueMention, String)> = doc
        .sentences()
        .iter()
        .flat_map(|st| st.values.iter())
        .chain(doc.values.iter())
        .filter(|vm| doc.value_set.by_mention(vm.uid).is_none())
        .map(|vm| (vm.clone(), doc.value_text(vm.uid).unwrap_or_default()))
        .collect();
    for (mention, text) in &pending {
        doc.value_set.push(mention, text.clone());
    }
    log::debug!("promoted {} value mentions in {}", pending.len(), doc.name);
    pending.len()
}
