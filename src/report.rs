//! Plain-text design report.

use std::fmt::Write;

use crate::input::TrussInput;
use crate::results::{AnalysisReport, AxialState};
use crate::truss::Truss;

/// Render a textual summary of the truss description and its solve.
///
/// The report lists the pass-through material data, a geometry summary of every
/// link, and either the solved forces or the reason the solve failed.
#[must_use]
pub fn render_report(input: &TrussInput, truss: &Truss, report: &AnalysisReport) -> String {
    let mut output = String::new();

    writeln!(&mut output, "\tTruss Design Report").expect("writing to string cannot fail");
    writeln!(
        &mut output,
        "Title:  {}",
        input.title.as_deref().unwrap_or("(untitled)")
    )
    .expect("writing to string cannot fail");
    writeln!(
        &mut output,
        "Static Factor of Safety:  {}",
        optional(input.static_factor)
    )
    .expect("writing to string cannot fail");
    let material = input.material;
    writeln!(
        &mut output,
        "Ultimate Strength:  {}",
        optional(material.map(|m| m.ultimate_strength))
    )
    .expect("writing to string cannot fail");
    writeln!(
        &mut output,
        "Yield Strength:  {}",
        optional(material.map(|m| m.yield_strength))
    )
    .expect("writing to string cannot fail");
    writeln!(
        &mut output,
        "Modulus of Elasticity:  {}",
        optional(material.map(|m| m.elastic_modulus))
    )
    .expect("writing to string cannot fail");

    output.push_str("_____________Link Summary________________\n");
    output.push_str("Link\t(1)\t(2)\tLength\tAngle\n");
    let mut longest: Option<(&str, f64)> = None;
    for member in truss.member_names() {
        let (start, end) = truss.member_endpoints(member).unwrap_or(("?", "?"));
        match (truss.member_length(member), truss.member_angle(member)) {
            (Ok(length), Ok(angle)) => {
                writeln!(
                    &mut output,
                    "{member}\t{start}\t{end}\t{length:.2}\t{angle:.2}"
                )
                .expect("writing to string cannot fail");
                if longest.map_or(true, |(_, best)| length > best) {
                    longest = Some((member, length));
                }
            }
            _ => writeln!(&mut output, "{member}\t{start}\t{end}\tn/a\tn/a")
                .expect("writing to string cannot fail"),
        }
    }
    if let Some((member, length)) = longest {
        writeln!(&mut output, "Longest link:  {member} ({length:.2})")
            .expect("writing to string cannot fail");
    }

    output.push_str("_____________Equilibrium________________\n");
    writeln!(&mut output, "Status:  {:?}", report.status).expect("writing to string cannot fail");
    if let Some(error) = &report.error {
        writeln!(&mut output, "Error:  {error}").expect("writing to string cannot fail");
    }
    if !report.member_forces.is_empty() {
        output.push_str("Member\tForce\tState\n");
        for entry in &report.member_forces {
            let marker = match entry.state {
                AxialState::Tension => "T",
                AxialState::Compression => "C",
                AxialState::ZeroForce => "0",
            };
            writeln!(&mut output, "{}\t{:+.3}\t{marker}", entry.member, entry.force)
                .expect("writing to string cannot fail");
        }
    }
    if !report.reactions.is_empty() {
        output.push_str("Joint\tRx\tRy\n");
        for entry in &report.reactions {
            writeln!(
                &mut output,
                "{}\t{:+.3}\t{:+.3}",
                entry.joint, entry.force.x, entry.force.y
            )
            .expect("writing to string cannot fail");
        }
    }
    for warning in &report.warnings {
        writeln!(&mut output, "Warning:  {warning}").expect("writing to string cannot fail");
    }

    output
}

/// Format an optional scalar with two decimals.
fn optional(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_owned(), |value| format!("{value:.2}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_truss;
    use crate::solver::SolverOptions;

    const BRACKET: &str = "\
title, Wall bracket
static_factor, 2
node, A, 0, 1
node, B, 0, 0
node, C, 1, 0
link, AC, A, C
link, BC, B, C
support, A, pin
support, B, pin
load, C, 0, -10
";

    #[test]
    fn formats_human_readable_report() {
        let input = parse_truss(BRACKET).expect("parses");
        let truss = input.build().expect("builds");
        let report = render_report(&input, &truss, &truss.analyze(&SolverOptions::default()));

        assert!(report.contains("Title:  Wall bracket"));
        assert!(report.contains("Static Factor of Safety:  2.00"));
        assert!(report.contains("Yield Strength:  n/a"));
        assert!(report.contains("AC\tA\tC\t1.41\t315.00"));
        assert!(report.contains("Longest link:  AC (1.41)"));
        assert!(report.contains("Status:  Determinate"));
        assert!(report.contains("BC\t-10.000\tC"));
        assert!(report.contains("A\t-10.000\t+10.000"));
    }

    #[test]
    fn warnings_are_written_as_sentences() {
        let input = parse_truss(&format!("{BRACKET}node, Spare, 9, 9\n")).expect("parses");
        let truss = input.build().expect("builds");
        let report = render_report(&input, &truss, &truss.analyze(&SolverOptions::default()));
        assert!(report.contains(
            "Warning:  joint Spare has no members, support or load and was left out"
        ));
        assert!(!report.contains("IsolatedJoint"));
    }

    #[test]
    fn failed_solves_show_the_error() {
        let input = parse_truss(&BRACKET.replace("support, B, pin", "support, B, free"))
            .expect("parses");
        let truss = input.build().expect("builds");
        let report = render_report(&input, &truss, &truss.analyze(&SolverOptions::default()));
        assert!(report.contains("Status:  Unstable"));
        assert!(report.contains("Error:  structure is unstable"));
        assert!(!report.contains("Member\tForce"));
    }
}
