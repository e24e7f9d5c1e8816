//! Reader for the line-oriented truss description format.
//!
//! Each non-blank line holds a keyword followed by comma separated fields. Keywords
//! are case-insensitive and may appear in any order; lines starting with `#` are
//! comments and unknown keywords are skipped.
//!
//! ```text
//! title, 'Warren truss'
//! material, 50000, 36000, 29000000
//! static_factor, 2.0
//! node, Left, 0, 0
//! node, Right, 240, 0
//! link, LR, Left, Right
//! support, Left, pin
//! support, Right, roller, y
//! load, Left, 0, -20
//! ```

use std::collections::HashSet;

use log::{debug, warn};

use crate::errors::ParseError;
use crate::geometry::{Direction, Force, Point};
use crate::input::{JointRecord, Material, MemberRecord, TrussInput};
use crate::supports::Support;

/// Parse the text of an input file.
///
/// # Errors
///
/// Returns a [`ParseError`] naming the first offending line.
///
/// # Examples
/// ```
/// use truss_statics::{parse_truss, Support};
///
/// let input = parse_truss("node, A, 0, 0\nNODE, B, 3, 4\nlink, AB, A, B\nsupport, A, pin\n")
///     .expect("valid input");
/// assert_eq!(input.joints.len(), 2);
/// assert_eq!(input.joints[0].support, Support::Pin);
/// assert_eq!(input.members[0].end, "B");
/// ```
pub fn parse_truss(source: &str) -> Result<TrussInput, ParseError> {
    let mut input = TrussInput::default();
    let mut member_names = HashSet::new();
    let mut supports: Vec<(usize, String, Support)> = Vec::new();
    let mut loads: Vec<(usize, String, Force)> = Vec::new();

    for (idx, raw) in source.lines().enumerate() {
        let line = idx + 1;
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let cells: Vec<&str> = trimmed.split(',').map(clean).collect();
        let keyword = cells[0].to_lowercase();
        let fields = &cells[1..];
        debug!("line {line}: `{keyword}` with {} fields", fields.len());

        match keyword.as_str() {
            "title" => {
                require(line, &keyword, fields, 1)?;
                input.title = Some(fields.join(", "));
            }
            "material" => {
                require(line, &keyword, fields, 3)?;
                let ultimate_strength = material_value(line, fields[0])?;
                let yield_strength = material_value(line, fields[1])?;
                let elastic_modulus = material_value(line, fields[2])?;
                input.material = Some(Material {
                    ultimate_strength,
                    yield_strength,
                    elastic_modulus,
                });
            }
            "static_factor" => {
                require(line, &keyword, fields, 1)?;
                let value = number(line, fields[0])?;
                if value <= 0.0 {
                    return Err(ParseError::NonPositiveStaticFactor { line, value });
                }
                input.static_factor = Some(value);
            }
            "node" => {
                require(line, &keyword, fields, 3)?;
                let name = fields[0];
                if input.joints.iter().any(|joint| joint.name == name) {
                    return Err(ParseError::DuplicateNode {
                        line,
                        name: name.to_owned(),
                    });
                }
                let position = Point::new(number(line, fields[1])?, number(line, fields[2])?);
                input.joints.push(JointRecord::new(name, position));
            }
            "link" => {
                require(line, &keyword, fields, 3)?;
                if !member_names.insert(fields[0].to_owned()) {
                    return Err(ParseError::DuplicateLink {
                        line,
                        name: fields[0].to_owned(),
                    });
                }
                input
                    .members
                    .push(MemberRecord::new(fields[0], fields[1], fields[2]));
            }
            "support" => {
                require(line, &keyword, fields, 2)?;
                let support = support(line, &fields[1..])?;
                supports.push((line, fields[0].to_owned(), support));
            }
            "load" => {
                require(line, &keyword, fields, 3)?;
                let load = Force::new(number(line, fields[1])?, number(line, fields[2])?);
                loads.push((line, fields[0].to_owned(), load));
            }
            _ => warn!("line {line}: ignoring unknown keyword `{}`", cells[0]),
        }
    }

    for (line, name, support) in supports {
        joint_mut(&mut input, line, &name)?.support = support;
    }
    for (line, name, load) in loads {
        let joint = joint_mut(&mut input, line, &name)?;
        joint.load = Force::new(joint.load.x + load.x, joint.load.y + load.y);
    }
    Ok(input)
}

/// Strip surrounding whitespace and quotes from a field.
fn clean(cell: &str) -> &str {
    cell.trim().trim_matches(|c: char| c == '\'' || c == '"').trim()
}

/// Ensure at least `expected` fields follow the keyword.
fn require(line: usize, keyword: &str, fields: &[&str], expected: usize) -> Result<(), ParseError> {
    if fields.len() < expected || fields[..expected].iter().any(|field| field.is_empty()) {
        Err(ParseError::MissingField {
            line,
            keyword: keyword.to_owned(),
            expected,
        })
    } else {
        Ok(())
    }
}

/// Parse a finite number.
fn number(line: usize, value: &str) -> Result<f64, ParseError> {
    value
        .parse::<f64>()
        .ok()
        .filter(|parsed| parsed.is_finite())
        .ok_or_else(|| ParseError::InvalidNumber {
            line,
            value: value.to_owned(),
        })
}

/// Parse a non-negative material property.
fn material_value(line: usize, value: &str) -> Result<f64, ParseError> {
    let value = number(line, value)?;
    if value < 0.0 {
        return Err(ParseError::NegativeMaterial { line, value });
    }
    Ok(value)
}

/// Interpret `kind[, dx, dy | axis]`.
fn support(line: usize, fields: &[&str]) -> Result<Support, ParseError> {
    match fields[0].to_lowercase().as_str() {
        "free" => Ok(Support::Free),
        "pin" | "pinned" => Ok(Support::Pin),
        "roller" => match &fields[1..] {
            [] => Ok(Support::roller_y()),
            [axis] if axis.eq_ignore_ascii_case("x") => Ok(Support::roller_x()),
            [axis] if axis.eq_ignore_ascii_case("y") => Ok(Support::roller_y()),
            [value] => Err(ParseError::InvalidNumber {
                line,
                value: (*value).to_owned(),
            }),
            [dx, dy, ..] => Ok(Support::Roller {
                direction: Direction::new(number(line, dx)?, number(line, dy)?),
            }),
        },
        other => Err(ParseError::UnknownSupportKind {
            line,
            kind: other.to_owned(),
        }),
    }
}

/// Find the joint record a `support` or `load` line refers to.
fn joint_mut<'a>(
    input: &'a mut TrussInput,
    line: usize,
    name: &str,
) -> Result<&'a mut JointRecord, ParseError> {
    input
        .joints
        .iter_mut()
        .find(|joint| joint.name == name)
        .ok_or_else(|| ParseError::UnknownNode {
            line,
            name: name.to_owned(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
# Warren truss from the coursework handout
Title, 'Warren Truss'
Material, 50000, 36000, 29000000
Static_factor, 2.5

node, Left, 0, 0
node, B, 60, 103.92
node, Right, 120, 0
link, L1, Left, B
link, L2, B, Right
link, L3, Left, Right
support, Left, pin
support, Right, roller, y
load, B, 0, -20
";

    #[test]
    fn reads_all_keywords() {
        let input = parse_truss(SAMPLE).expect("sample parses");
        assert_eq!(input.title.as_deref(), Some("Warren Truss"));
        assert_eq!(
            input.material,
            Some(Material {
                ultimate_strength: 50_000.0,
                yield_strength: 36_000.0,
                elastic_modulus: 29_000_000.0,
            })
        );
        assert_eq!(input.static_factor, Some(2.5));
        assert_eq!(input.joints.len(), 3);
        assert_eq!(input.members.len(), 3);
        assert_eq!(input.joints[0].support, Support::Pin);
        assert_eq!(input.joints[2].support, Support::roller_y());
        assert_eq!(input.joints[1].load, Force::new(0.0, -20.0));
    }

    #[test]
    fn keywords_may_appear_in_any_order() {
        let input = parse_truss("load, A, 1, 2\nsupport, A, roller, 1, 1\nLINK, AB, A, B\nnode, A, 0, 0\n")
            .expect("order independent");
        assert_eq!(input.joints[0].load, Force::new(1.0, 2.0));
        assert_eq!(
            input.joints[0].support,
            Support::Roller {
                direction: Direction::new(1.0, 1.0)
            }
        );
    }

    #[test]
    fn repeated_loads_accumulate() {
        let input = parse_truss("node, A, 0, 0\nload, A, 1, 0\nload, A, 0, -3\n").expect("parses");
        assert_eq!(input.joints[0].load, Force::new(1.0, -3.0));
    }

    #[test]
    fn unknown_keywords_are_ignored() {
        let input = parse_truss("colour, red\nnode, A, 0, 0\n").expect("parses");
        assert_eq!(input.joints.len(), 1);
    }

    #[test]
    fn bad_lines_report_their_number() {
        assert_eq!(
            parse_truss("node, A, 0, 0\nnode, B, zero, 0\n"),
            Err(ParseError::InvalidNumber {
                line: 2,
                value: "zero".into()
            })
        );
        assert_eq!(
            parse_truss("\nlink, AB, A\n"),
            Err(ParseError::MissingField {
                line: 2,
                keyword: "link".into(),
                expected: 3
            })
        );
        assert_eq!(
            parse_truss("node, A, 0, 0\nnode, A, 1, 1\n"),
            Err(ParseError::DuplicateNode {
                line: 2,
                name: "A".into()
            })
        );
        assert_eq!(
            parse_truss("node, A, 0, 0\nsupport, A, hinge\n"),
            Err(ParseError::UnknownSupportKind {
                line: 2,
                kind: "hinge".into()
            })
        );
        assert_eq!(
            parse_truss("node, A, 0, 0\nload, Z, 0, 1\n"),
            Err(ParseError::UnknownNode {
                line: 2,
                name: "Z".into()
            })
        );
    }

    #[test]
    fn material_and_static_factor_are_validated() {
        assert_eq!(
            parse_truss("material, 1, -2, 3\n"),
            Err(ParseError::NegativeMaterial {
                line: 1,
                value: -2.0
            })
        );
        assert_eq!(
            parse_truss("static_factor, 0\n"),
            Err(ParseError::NonPositiveStaticFactor {
                line: 1,
                value: 0.0
            })
        );
    }
}
