//! Ordered-selector dispatch.
//!
//! A [`Family`] is a table of [`Variant`] descriptors. Each variant carries a
//! tag, a numeric order, an applicability predicate, a strictness flag and
//! the action to run. [`select`] decides which variant runs next for a given
//! context; it never runs anything itself.

use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;

type Matcher<C> = Box<dyn Fn(&C) -> bool>;
type Action<C, E> = Box<dyn Fn(&mut C) -> Result<(), E>>;

/// Errors raised while selecting the next variant.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("no matching variant in strict family '{family}' (remaining: {})", .remaining.join(", "))]
    NoMatchingVariant {
        family: String,
        remaining: Vec<String>,
    },
}

/// One candidate unit of work in a dispatch family.
pub struct Variant<C, T, E> {
    /// Identifies the variant within its family
    pub tag: T,
    /// Lower orders run first
    pub order: f64,
    /// When set, an unmatched family with this variant remaining is an error
    pub strict: bool,
    matcher: Matcher<C>,
    action: Action<C, E>,
}

impl<C, T, E> Variant<C, T, E> {
    /// Create a non-strict variant that applies to every context.
    pub fn new<F>(tag: T, order: f64, action: F) -> Self
    where
        F: Fn(&mut C) -> Result<(), E> + 'static,
    {
        Self {
            tag,
            order,
            strict: false,
            matcher: Box::new(|_| true),
            action: Box::new(action),
        }
    }

    /// Restrict the variant to contexts accepted by `matcher`.
    pub fn with_matcher<M>(mut self, matcher: M) -> Self
    where
        M: Fn(&C) -> bool + 'static,
    {
        self.matcher = Box::new(matcher);
        self
    }

    /// Mark the variant as strict.
    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }

    /// Whether this variant applies to `ctx`.
    pub fn matches(&self, ctx: &C) -> bool {
        (self.matcher)(ctx)
    }

    /// Run the variant's action.
    pub fn execute(&self, ctx: &mut C) -> Result<(), E> {
        (self.action)(ctx)
    }
}

impl<C, T: fmt::Debug, E> fmt::Debug for Variant<C, T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Variant")
            .field("tag", &self.tag)
            .field("order", &self.order)
            .field("strict", &self.strict)
            .finish_non_exhaustive()
    }
}

/// An ordered family of variants.
///
/// Registration order is significant: it breaks ties between variants with
/// equal `order`.
pub struct Family<C, T, E> {
    name: String,
    variants: Vec<Variant<C, T, E>>,
}

impl<C, T, E> Family<C, T, E> {
    /// Create an empty family.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            variants: Vec::new(),
        }
    }

    /// Register a variant at the end of the family.
    pub fn register(&mut self, variant: Variant<C, T, E>) -> &mut Self {
        self.variants.push(variant);
        self
    }

    /// The family's name (used in diagnostics).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All variants in registration order.
    pub fn variants(&self) -> &[Variant<C, T, E>] {
        &self.variants
    }
}

/// Outcome of a successful selection.
pub enum Selection<'f, C, T, E> {
    /// The variant that should run next
    Variant(&'f Variant<C, T, E>),
    /// Nothing left to run
    Terminal,
}

impl<C, T, E> Selection<'_, C, T, E> {
    /// The selected variant's tag, or `None` when terminal.
    pub fn tag(&self) -> Option<&T> {
        match self {
            Selection::Variant(variant) => Some(&variant.tag),
            Selection::Terminal => None,
        }
    }
}

/// Select the next variant to run.
///
/// Among variants not in `exclude` whose matcher accepts `ctx`, returns the
/// one with the smallest order, the first registered winning ties. When none
/// match, returns [`Selection::Terminal`] unless a remaining variant is strict.
pub fn select<'f, C, T, E>(
    family: &'f Family<C, T, E>,
    ctx: &C,
    exclude: &HashSet<T>,
) -> Result<Selection<'f, C, T, E>, DispatchError>
where
    T: Eq + Hash + fmt::Debug,
{
    let mut best: Option<&'f Variant<C, T, E>> = None;
    let mut strict_remaining = false;

    for variant in family.variants.iter().filter(|v| !exclude.contains(&v.tag)) {
        strict_remaining |= variant.strict;
        if !variant.matches(ctx) {
            continue;
        }
        match best {
            Some(current) if variant.order.total_cmp(&current.order).is_ge() => {}
            _ => best = Some(variant),
        }
    }

    match best {
        Some(variant) => Ok(Selection::Variant(variant)),
        None if strict_remaining => Err(DispatchError::NoMatchingVariant {
            family: family.name.clone(),
            remaining: family
                .variants
                .iter()
                .filter(|v| !exclude.contains(&v.tag))
                .map(|v| format!("{:?}", v.tag))
                .collect(),
        }),
        None => Ok(Selection::Terminal),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum Tag {
        A,
        B,
        C,
    }

    type TestFamily = Family<u32, Tag, DispatchError>;

    fn family(entries: &[(Tag, f64)]) -> TestFamily {
        let mut family = Family::new("test");
        for &(tag, order) in entries {
            family.register(Variant::new(tag, order, |_: &mut u32| Ok(())));
        }
        family
    }

    fn selected(family: &TestFamily, ctx: u32, exclude: &[Tag]) -> Option<Tag> {
        let exclude: HashSet<Tag> = exclude.iter().copied().collect();
        select(family, &ctx, &exclude).unwrap().tag().copied()
    }

    #[test]
    fn test_selects_lowest_order() {
        let family = family(&[(Tag::A, 3.0), (Tag::B, 1.0), (Tag::C, 2.0)]);
        assert_eq!(selected(&family, 0, &[]), Some(Tag::B));
    }

    #[test]
    fn test_selection_ignores_registration_order() {
        let entries = [(Tag::A, 2.5), (Tag::B, -1.0), (Tag::C, 7.0)];
        let permutations = [[0, 1, 2], [0, 2, 1], [1, 0, 2], [1, 2, 0], [2, 0, 1], [2, 1, 0]];

        for permutation in permutations {
            let ordered: Vec<_> = permutation.iter().map(|&i| entries[i]).collect();
            let family = family(&ordered);
            assert_eq!(selected(&family, 0, &[]), Some(Tag::B));
            assert_eq!(selected(&family, 0, &[Tag::B]), Some(Tag::A));
            assert_eq!(selected(&family, 0, &[Tag::B, Tag::A]), Some(Tag::C));
        }
    }

    #[test]
    fn test_ties_go_to_first_registered() {
        let family = family(&[(Tag::C, 1.0), (Tag::A, 1.0), (Tag::B, 1.0)]);
        assert_eq!(selected(&family, 0, &[]), Some(Tag::C));
        assert_eq!(selected(&family, 0, &[Tag::C]), Some(Tag::A));
    }

    #[test]
    fn test_matcher_filters_candidates() {
        let mut family: TestFamily = Family::new("test");
        family
            .register(Variant::new(Tag::A, 1.0, |_: &mut u32| Ok(())).with_matcher(|ctx| *ctx > 10))
            .register(Variant::new(Tag::B, 2.0, |_: &mut u32| Ok(())));

        assert_eq!(selected(&family, 5, &[]), Some(Tag::B));
        assert_eq!(selected(&family, 50, &[]), Some(Tag::A));
    }

    #[test]
    fn test_terminal_when_nothing_matches() {
        let mut family: TestFamily = Family::new("test");
        family.register(Variant::new(Tag::A, 1.0, |_: &mut u32| Ok(())).with_matcher(|_| false));

        assert_eq!(selected(&family, 0, &[]), None);
        assert_eq!(selected(&family, 0, &[Tag::A]), None);
    }

    #[test]
    fn test_strict_family_without_match_fails() {
        let mut family: TestFamily = Family::new("strict");
        family
            .register(
                Variant::new(Tag::A, 1.0, |_: &mut u32| Ok(()))
                    .with_matcher(|_| false)
                    .strict(),
            )
            .register(Variant::new(Tag::B, 2.0, |_: &mut u32| Ok(())).with_matcher(|_| false));

        let err = select(&family, &0, &HashSet::new()).err().unwrap();
        assert_eq!(
            err,
            DispatchError::NoMatchingVariant {
                family: "strict".to_string(),
                remaining: vec!["A".to_string(), "B".to_string()],
            }
        );
    }

    #[test]
    fn test_excluded_strict_variant_does_not_fail() {
        let mut family: TestFamily = Family::new("strict");
        family.register(
            Variant::new(Tag::A, 1.0, |_: &mut u32| Ok(()))
                .with_matcher(|_| false)
                .strict(),
        );

        let exclude: HashSet<Tag> = [Tag::A].into_iter().collect();
        assert!(matches!(
            select(&family, &0, &exclude),
            Ok(Selection::Terminal)
        ));
    }

    #[test]
    fn test_select_does_not_run_actions() {
        let mut family: TestFamily = Family::new("test");
        family.register(Variant::new(Tag::A, 1.0, |ctx: &mut u32| {
            *ctx += 1;
            Ok(())
        }));

        let ctx = 0;
        let selection = select(&family, &ctx, &HashSet::new()).unwrap();
        assert_eq!(selection.tag(), Some(&Tag::A));
        assert_eq!(ctx, 0);
    }
}
