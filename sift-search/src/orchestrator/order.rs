//! Backend try-order: preferred, then fallbacks, then everything else.

/// Compute the order in which backends are tried for one search.
///
/// 1. `preferred`, if it names a registered backend
/// 2. each of `fallbacks` that names a registered backend, in listed order
/// 3. every remaining registered backend, in registration order
///
/// Names match case-insensitively and surrounding whitespace is ignored. The
/// registered spelling is what ends up in the order. Each backend appears at
/// most once.
pub fn try_order<S: AsRef<str>>(
    registered: &[S],
    preferred: Option<&str>,
    fallbacks: &[String],
) -> Vec<String> {
    let known: Vec<&str> = registered.iter().map(|name| name.as_ref()).collect();
    let requested = preferred
        .into_iter()
        .chain(fallbacks.iter().map(String::as_str))
        .chain(known.iter().copied());

    let mut order: Vec<String> = Vec::with_capacity(known.len());
    for name in requested {
        let name = name.trim();
        match known.iter().find(|k| k.eq_ignore_ascii_case(name)) {
            Some(&canonical) if !order.iter().any(|seen| seen == canonical) => {
                order.push(canonical.to_owned());
            }
            Some(_) => {}
            None => tracing::debug!(backend = name, "ignoring unknown backend in routing config"),
        }
    }
    order
}
