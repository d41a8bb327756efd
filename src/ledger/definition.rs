//! Set-definition lines

use std::fmt;

use crate::knowledge::SetId;
use crate::stateset::NodeDump;

/// Sets every certificate starts with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Predefined {
    Empty,
    Goal,
    Init,
}

impl Predefined {
    pub fn tag(&self) -> char {
        match self {
            Predefined::Empty => 'e',
            Predefined::Goal => 'g',
            Predefined::Init => 'i',
        }
    }

    pub fn id(&self) -> SetId {
        match self {
            Predefined::Empty => SetId::EMPTY,
            Predefined::Goal => SetId::GOAL,
            Predefined::Init => SetId::INIT,
        }
    }
}

/// How a set is defined. The construct doubles as its justification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetDefinition {
    Predefined(Predefined),
    /// Canonical decision diagram over fact indices
    Diagram(NodeDump),
    /// Explicit enumeration of hex-encoded witness states
    Explicit {
        fact_count: usize,
        witnesses: Vec<String>,
    },
    Union(SetId, SetId),
    Intersection(SetId, SetId),
    Complement(SetId),
    /// Successors of the set under all actions
    Progression(SetId),
}

impl SetDefinition {
    /// Set ids this definition refers to.
    pub fn cited_sets(&self) -> Vec<SetId> {
        match self {
            SetDefinition::Predefined(_)
            | SetDefinition::Diagram(_)
            | SetDefinition::Explicit { .. } => vec![],
            SetDefinition::Union(a, b) | SetDefinition::Intersection(a, b) => vec![*a, *b],
            SetDefinition::Complement(a) | SetDefinition::Progression(a) => vec![*a],
        }
    }
}

impl fmt::Display for SetDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SetDefinition::Predefined(p) => write!(f, "c {}", p.tag()),
            SetDefinition::Diagram(dump) => write!(f, "b {}", dump),
            SetDefinition::Explicit {
                fact_count,
                witnesses,
            } => {
                write!(f, "e {}", fact_count)?;
                for i in 0..*fact_count {
                    write!(f, " {}", i)?;
                }
                write!(f, " :")?;
                for w in witnesses {
                    write!(f, " {}", w)?;
                }
                write!(f, " ;")
            }
            SetDefinition::Union(a, b) => write!(f, "u {} {}", a, b),
            SetDefinition::Intersection(a, b) => write!(f, "i {} {}", a, b),
            SetDefinition::Complement(a) => write!(f, "n {}", a),
            SetDefinition::Progression(a) => write!(f, "p {} 0", a),
        }
    }
}

/// A numbered set definition as written to the certificate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetRecord {
    pub id: SetId,
    pub definition: SetDefinition,
}

impl fmt::Display for SetRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e {} {}", self.id, self.definition)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(id: usize, definition: SetDefinition) -> String {
        SetRecord {
            id: SetId(id),
            definition,
        }
        .to_string()
    }

    #[test]
    fn test_predefined_lines() {
        assert_eq!(line(0, SetDefinition::Predefined(Predefined::Empty)), "e 0 c e");
        assert_eq!(line(1, SetDefinition::Predefined(Predefined::Goal)), "e 1 c g");
        assert_eq!(line(2, SetDefinition::Predefined(Predefined::Init)), "e 2 c i");
    }

    #[test]
    fn test_compound_lines() {
        assert_eq!(line(5, SetDefinition::Progression(SetId(4))), "e 5 p 4 0");
        assert_eq!(line(6, SetDefinition::Union(SetId(4), SetId(0))), "e 6 u 4 0");
        assert_eq!(line(7, SetDefinition::Intersection(SetId(4), SetId(1))), "e 7 i 4 1");
        assert_eq!(line(8, SetDefinition::Complement(SetId(7))), "e 8 n 7");
    }

    #[test]
    fn test_explicit_line() {
        let def = SetDefinition::Explicit {
            fact_count: 4,
            witnesses: vec!["6".into(), "9".into()],
        };
        assert_eq!(line(3, def), "e 3 e 4 0 1 2 3 : 6 9 ;");
    }

    #[test]
    fn test_cited_sets() {
        assert_eq!(
            SetDefinition::Union(SetId(3), SetId(1)).cited_sets(),
            vec![SetId(3), SetId(1)]
        );
        assert!(SetDefinition::Predefined(Predefined::Goal).cited_sets().is_empty());
    }
}
