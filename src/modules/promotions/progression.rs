//! Class progression.
//!
//! Class names are free text ("JSS 2", "Primary 4", "P.4", "Nur.1"), so
//! names are compared in a tight form: upper case with spaces and dots
//! removed. A successor is only ever one of the classes passed in; when no
//! existing class matches the computed next level, the result is
//! [`Progression::Unresolved`] rather than an invented class.

use std::sync::LazyLock;

use regex::Regex;

use gradeline_models::SchoolClass;

/// Tight names of the classes that finish a school section.
const TERMINAL_CLASSES: [&str; 2] = ["JSS3", "SS3"];

/// Well-known successors, keyed by tight name.
const SUCCESSORS: [(&str, &str); 14] = [
    ("JSS1", "JSS 2"),
    ("JSS2", "JSS 3"),
    ("SS1", "SS 2"),
    ("SS2", "SS 3"),
    ("PRIMARY1", "PRIMARY 2"),
    ("PRIMARY2", "PRIMARY 3"),
    ("PRIMARY3", "PRIMARY 4"),
    ("PRIMARY4", "PRIMARY 5"),
    ("P1", "P.2"),
    ("P2", "P.3"),
    ("P3", "P.4"),
    ("P4", "P.5"),
    ("NURSERY1", "NURSERY 2"),
    ("NUR1", "NUR.2"),
];

static NUMBERED_LEVEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(PRIMARY|P|NURSERY|NUR)(\d+)$").expect("numbered level pattern is valid")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Family {
    Primary,
    Nursery,
}

impl Family {
    /// Lowest level treated as the top of the section when nothing follows it.
    fn final_level(self) -> u32 {
        match self {
            Self::Primary => 5,
            Self::Nursery => 2,
        }
    }

    /// Tight spellings of `level`, the class's own spelling first.
    fn spellings(self, short: bool, level: u32) -> [String; 2] {
        let (long, abbreviated) = match self {
            Self::Primary => (format!("PRIMARY{level}"), format!("P{level}")),
            Self::Nursery => (format!("NURSERY{level}"), format!("NUR{level}")),
        };
        if short {
            [abbreviated, long]
        } else {
            [long, abbreviated]
        }
    }
}

/// A numbered primary or nursery class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct NumberedLevel {
    family: Family,
    short: bool,
    level: u32,
}

impl NumberedLevel {
    fn parse(tight_name: &str) -> Option<Self> {
        let caps = NUMBERED_LEVEL.captures(tight_name)?;
        let level = caps[2].parse().ok()?;
        let (family, short) = match &caps[1] {
            "PRIMARY" => (Family::Primary, false),
            "P" => (Family::Primary, true),
            "NURSERY" => (Family::Nursery, false),
            _ => (Family::Nursery, true),
        };
        Some(Self {
            family,
            short,
            level,
        })
    }
}

/// Where a class leads at the end of a session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Progression<'a> {
    /// Last class of its section.
    Graduating,
    /// An existing class one level up.
    AdvanceTo(&'a SchoolClass),
    /// A successor was expected but no such class exists.
    Unresolved,
}

pub struct ClassProgressionResolver;

impl ClassProgressionResolver {
    /// Resolve `class_name` against the school's `classes`. Inactive classes
    /// are ignored.
    pub fn resolve<'a>(class_name: &str, classes: &'a [SchoolClass]) -> Progression<'a> {
        let name = tight(class_name);
        if TERMINAL_CLASSES.contains(&name.as_str()) {
            return Progression::Graduating;
        }

        if let Some(next) = Self::successor(&name, classes) {
            return Progression::AdvanceTo(next);
        }

        match NumberedLevel::parse(&name) {
            Some(numbered) if numbered.level >= numbered.family.final_level() => {
                Progression::Graduating
            }
            _ => Progression::Unresolved,
        }
    }

    pub fn is_graduating(class_name: &str, classes: &[SchoolClass]) -> bool {
        matches!(Self::resolve(class_name, classes), Progression::Graduating)
    }

    pub fn next_class<'a>(class_name: &str, classes: &'a [SchoolClass]) -> Option<&'a SchoolClass> {
        match Self::resolve(class_name, classes) {
            Progression::AdvanceTo(class) => Some(class),
            _ => None,
        }
    }

    fn successor<'a>(name: &str, classes: &'a [SchoolClass]) -> Option<&'a SchoolClass> {
        let listed = SUCCESSORS
            .iter()
            .find(|(from, _)| *from == name)
            .and_then(|(_, to)| find_by_tight_name(classes, &tight(to)));
        if listed.is_some() {
            return listed;
        }

        let numbered = NumberedLevel::parse(name)?;
        let next_level = numbered.level.checked_add(1)?;
        numbered
            .family
            .spellings(numbered.short, next_level)
            .iter()
            .find_map(|spelling| find_by_tight_name(classes, spelling))
    }
}

/// Upper case with whitespace and dots removed: `"Nur. 1"` -> `"NUR1"`.
pub fn tight(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace() && *c != '.')
        .flat_map(char::to_uppercase)
        .collect()
}

fn find_by_tight_name<'a>(classes: &'a [SchoolClass], tight_name: &str) -> Option<&'a SchoolClass> {
    classes
        .iter()
        .filter(|class| class.is_active)
        .find(|class| tight(&class.name) == tight_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use gradeline_models::ClassId;

    fn classes(names: &[&str]) -> Vec<SchoolClass> {
        let now = Utc::now();
        names
            .iter()
            .map(|name| SchoolClass {
                id: ClassId::new(),
                name: name.to_string(),
                form_teacher_id: None,
                is_active: true,
                created_at: now,
                updated_at: now,
            })
            .collect()
    }

    fn next_name(from: &str, school: &[SchoolClass]) -> Option<String> {
        ClassProgressionResolver::next_class(from, school).map(|c| c.name.clone())
    }

    #[test]
    fn test_tight_names() {
        assert_eq!(tight(" Jss 1 "), "JSS1");
        assert_eq!(tight("S.S.3"), "SS3");
        assert_eq!(tight("Nur. 2"), "NUR2");
    }

    #[test]
    fn test_terminal_classes_graduate() {
        let school = classes(&["JSS 1", "JSS 2", "JSS 3", "SS 1", "SS 2", "SS 3"]);
        for name in ["JSS 3", "jss3", "SS 3", "S.S.3"] {
            assert!(ClassProgressionResolver::is_graduating(name, &school), "{name}");
        }
        assert!(!ClassProgressionResolver::is_graduating("JSS 1", &school));
    }

    #[test]
    fn test_next_class_from_table() {
        let school = classes(&["JSS 1", "JSS 2", "SS1", "SS2"]);
        assert_eq!(next_name("JSS 1", &school).as_deref(), Some("JSS 2"));
        assert_eq!(next_name("ss 1", &school).as_deref(), Some("SS2"));
    }

    #[test]
    fn test_next_class_must_exist() {
        let school = classes(&["JSS 1"]);
        assert_eq!(next_name("JSS 1", &school), None);
        assert_eq!(
            ClassProgressionResolver::resolve("JSS 1", &school),
            Progression::Unresolved
        );
    }

    #[test]
    fn test_inactive_classes_are_not_successors() {
        let mut school = classes(&["JSS 1", "JSS 2"]);
        school[1].is_active = false;
        assert_eq!(next_name("JSS 1", &school), None);
    }

    #[test]
    fn test_numbered_levels_beyond_the_table() {
        let school = classes(&["Primary 5", "Primary 6"]);
        assert_eq!(next_name("Primary 5", &school).as_deref(), Some("Primary 6"));
        assert!(!ClassProgressionResolver::is_graduating("Primary 5", &school));
        assert!(ClassProgressionResolver::is_graduating("Primary 6", &school));
    }

    #[test]
    fn test_spelling_variants_resolve() {
        let school = classes(&["P.1", "P.2", "Primary 7", "NUR 1", "Nursery 2"]);
        assert_eq!(next_name("P1", &school).as_deref(), Some("P.2"));
        assert_eq!(next_name("Primary 6", &school).as_deref(), Some("Primary 7"));
        assert_eq!(next_name("Nur.1", &school).as_deref(), Some("Nursery 2"));
    }

    #[test]
    fn test_primary_five_without_six_graduates() {
        let school = classes(&["Primary 4", "Primary 5"]);
        assert_eq!(next_name("Primary 4", &school).as_deref(), Some("Primary 5"));
        assert!(ClassProgressionResolver::is_graduating("Primary 5", &school));
        assert!(ClassProgressionResolver::is_graduating("P.5", &school));
    }

    #[test]
    fn test_low_levels_without_successor_are_unresolved() {
        let school = classes(&["Primary 3"]);
        assert_eq!(
            ClassProgressionResolver::resolve("Primary 3", &school),
            Progression::Unresolved
        );
        assert!(ClassProgressionResolver::is_graduating("Nursery 2", &school));
        assert_eq!(
            ClassProgressionResolver::resolve("Nursery 1", &school),
            Progression::Unresolved
        );
        assert_eq!(
            ClassProgressionResolver::resolve("Form Blue", &school),
            Progression::Unresolved
        );
    }

    #[test]
    fn test_extreme_levels_do_not_overflow() {
        let school = classes(&["Primary 1"]);
        assert_eq!(
            ClassProgressionResolver::resolve("Primary 4294967295", &school),
            Progression::Graduating
        );
        assert_eq!(next_name("P 4294967295", &school), None);
        assert_eq!(
            ClassProgressionResolver::resolve("Primary 99999999999", &school),
            Progression::Unresolved
        );
    }
}
