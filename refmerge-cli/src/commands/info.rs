//! Info command: supported kinds and their attribute tables

use refmerge::ReferentKind;

use crate::output::color;

pub fn run() -> Result<(), String> {
    println!();
    println!("{}", color("1;36", "refmerge"));
    println!("  Referent deduplication and ontology merging");
    println!();
    println!("{}:", color("1;33", "Version"));
    println!("  {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("{}:", color("1;33", "Kinds"));
    for kind in ReferentKind::ALL {
        println!("  {}", color("1", kind.type_name()));
        println!("    names:      {}", list(kind.name_attributes()));
        println!("    exclusive:  {}", list(kind.exclusive_attributes()));
        println!("    qualifiers: {}", list(kind.qualifier_attributes()));
    }
    println!();
    Ok(())
}

fn list(attrs: &[&str]) -> String {
    if attrs.is_empty() {
        "-".to_string()
    } else {
        attrs.join(", ")
    }
}
