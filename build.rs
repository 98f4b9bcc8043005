use std::collections::BTreeMap;
use std::env;
use std::fs::File;
use std::io::{BufWriter, Result, Write};
use std::path::Path;

fn main() -> Result<()> {
    let out_dir = env::var("OUT_DIR").unwrap();
    let dest_path = Path::new(&out_dir).join("tables_gen.rs");
    let mut f = File::create(&dest_path).map(BufWriter::new)?;

    generate_codon_tables(&mut f)?;
    generate_dna_ascii_to_2bit(&mut f)?;
    generate_aa1_to_codon_indices_fn(&mut f)?;
    generate_stop_codon_indices(&mut f)?;

    f.flush()?;
    println!("cargo::rerun-if-changed=build.rs");
    Ok(())
}

fn generate_codon_tables(f: &mut BufWriter<File>) -> Result<()> {
    writeln!(f, "/// Codon bytes in canonical (2-bit packed) index order.")?;
    write!(f, "pub(crate) static CODONS: [[u8; 3]; 64] = [")?;
    for (i, (dna3, _)) in DNA_TO_AA1_VEC.iter().enumerate() {
        assert_eq!(
            dna3.as_bytes(),
            codon_for_index(i),
            "codon table out of canonical order"
        );
        write!(f, "*b\"{}\", ", dna3)?;
    }
    writeln!(f, "];")?;

    writeln!(f, "/// Amino acid (1-letter) per canonical codon index; stops are `*`.")?;
    write!(f, "pub(crate) static CODON_TO_AA1: [u8; 64] = [")?;
    for (_, aa1) in DNA_TO_AA1_VEC {
        write!(f, "{}, ", aa1.as_bytes()[0])?;
    }
    writeln!(f, "];")?;
    Ok(())
}

fn generate_dna_ascii_to_2bit(f: &mut BufWriter<File>) -> Result<()> {
    let mut result = [255u8; 256];
    for (chars, val) in [("Aa", 0u8), ("Cc", 1), ("Gg", 2), ("TtUu", 3)] {
        for c in chars.bytes() {
            result[c as usize] = val;
        }
    }

    writeln!(f, "/// Mapping from DNA ASCII to 2-bit representation; 255 marks invalid bases.")?;
    write!(f, "const DNA_ASCII_TO_2BIT: [u8; 256] = [")?;
    for v in result {
        write!(f, "{}, ", v)?;
    }
    writeln!(f, "];")?;
    Ok(())
}

fn generate_aa1_to_codon_indices_fn(f: &mut BufWriter<File>) -> Result<()> {
    let mut by_aa: BTreeMap<u8, Vec<usize>> = BTreeMap::new();
    for (i, (_, aa1)) in DNA_TO_AA1_VEC.iter().enumerate() {
        let aa = aa1.as_bytes()[0];
        if aa != b'*' {
            by_aa.entry(aa).or_default().push(i);
        }
    }

    writeln!(f, "fn _aa1_to_codon_indices(aa1: u8) -> &'static [u8] {{")?;
    writeln!(f, "    match aa1 {{")?;
    for (aa, indices) in &by_aa {
        let list = indices
            .iter()
            .map(|i| i.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        writeln!(f, "        b'{}' => &[{}],", *aa as char, list)?;
    }
    writeln!(f, "        _ => &[],")?;
    writeln!(f, "    }}")?;
    writeln!(f, "}}")?;
    Ok(())
}

fn generate_stop_codon_indices(f: &mut BufWriter<File>) -> Result<()> {
    let stops: Vec<String> = DNA_TO_AA1_VEC
        .iter()
        .enumerate()
        .filter(|(_, (_, aa1))| *aa1 == "*")
        .map(|(i, _)| i.to_string())
        .collect();
    writeln!(
        f,
        "pub(crate) const STOP_CODON_INDICES: [u8; 3] = [{}];",
        stops.join(", ")
    )?;
    Ok(())
}

const BASES: [u8; 4] = [b'A', b'C', b'G', b'T'];

fn codon_for_index(index: usize) -> [u8; 3] {
    [
        BASES[(index >> 4) & 3],
        BASES[(index >> 2) & 3],
        BASES[index & 3],
    ]
}

// Standard genetic code, in canonical codon-index order.

const DNA_TO_AA1_VEC: &[(&str, &str)] = &[
    ("AAA", "K"),
    ("AAC", "N"),
    ("AAG", "K"),
    ("AAT", "N"),
    ("ACA", "T"),
    ("ACC", "T"),
    ("ACG", "T"),
    ("ACT", "T"),
    ("AGA", "R"),
    ("AGC", "S"),
    ("AGG", "R"),
    ("AGT", "S"),
    ("ATA", "I"),
    ("ATC", "I"),
    ("ATG", "M"),
    ("ATT", "I"),
    ("CAA", "Q"),
    ("CAC", "H"),
    ("CAG", "Q"),
    ("CAT", "H"),
    ("CCA", "P"),
    ("CCC", "P"),
    ("CCG", "P"),
    ("CCT", "P"),
    ("CGA", "R"),
    ("CGC", "R"),
    ("CGG", "R"),
    ("CGT", "R"),
    ("CTA", "L"),
    ("CTC", "L"),
    ("CTG", "L"),
    ("CTT", "L"),
    ("GAA", "E"),
    ("GAC", "D"),
    ("GAG", "E"),
    ("GAT", "D"),
    ("GCA", "A"),
    ("GCC", "A"),
    ("GCG", "A"),
    ("GCT", "A"),
    ("GGA", "G"),
    ("GGC", "G"),
    ("GGG", "G"),
    ("GGT", "G"),
    ("GTA", "V"),
    ("GTC", "V"),
    ("GTG", "V"),
    ("GTT", "V"),
    ("TAA", "*"),
    ("TAC", "Y"),
    ("TAG", "*"),
    ("TAT", "Y"),
    ("TCA", "S"),
    ("TCC", "S"),
    ("TCG", "S"),
    ("TCT", "S"),
    ("TGA", "*"),
    ("TGC", "C"),
    ("TGG", "W"),
    ("TGT", "C"),
    ("TTA", "L"),
    ("TTC", "F"),
    ("TTG", "L"),
    ("TTT", "F"),
];
