use criterion::{criterion_group, criterion_main, Criterion};

use codonopt::exclusion::ExclusionSet;
use codonopt::optimizer::{optimize_beam, optimize_dp, SearchParams};
use codonopt::scoring::ScoringOracle;

/// N-terminal fragment of avGFP.
static PROTEIN: &[u8] = b"MSKGEELFTGVVPILVELDGDVNGHKFSVSGEGEGDATYGKLTLKFICTTGKLPVPWPTLVTTF";

fn criterion_benchmark(c: &mut Criterion) {
    let oracle = ScoringOracle::empty();
    let exclusions = ExclusionSet::standard();
    let params = SearchParams::default();

    c.bench_function("optimize_dp GFP fragment", |b| {
        b.iter(|| optimize_dp(PROTEIN, &oracle, &exclusions, &params).unwrap())
    });
    c.bench_function("optimize_beam GFP fragment", |b| {
        b.iter(|| optimize_beam(PROTEIN, &oracle, &exclusions, &params).unwrap())
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
