//! Rendering retrieved passages into prompt context.

/// Render one line per document: `Document N: <passages joined by spaces>`.
///
/// `documents` yields zero-based document indices with their passages;
/// `N` is the one-based citation number.
pub fn render_documents<'a, I, S>(documents: I) -> String
where
    I: IntoIterator<Item = (usize, &'a [S])>,
    S: AsRef<str> + 'a,
{
    documents
        .into_iter()
        .map(|(index, passages)| {
            let body = passages
                .iter()
                .map(AsRef::as_ref)
                .collect::<Vec<_>>()
                .join(" ");
            format!("Document {}: {}", index + 1, body)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Passages of a single document joined by spaces, as handed to a speaker.
pub fn join_passages<S: AsRef<str>>(passages: &[S]) -> String {
    passages
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(" ")
}
