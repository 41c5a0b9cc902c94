use criterion::{black_box, criterion_group, criterion_main, Criterion};
use brand_classifier::classifier::agents::{BRAND_CATEGORY, VALIDATION};
use brand_classifier::classifier::capability::{parse_completion, render_prompt};
use brand_classifier::{clarification_reasons, Confidence, Invocation, Label};

fn bench_completion_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("Completion parsing");
    group.sample_size(50);
    group.warm_up_time(std::time::Duration::from_secs(1));

    // Model continued right after the prompt's trailing header
    group.bench_function("continuation", |b| b.iter(|| {
        parse_completion(&BRAND_CATEGORY, black_box(" Samsung\nCategory: Electronics\nConfidence: 0.82"))
    }));

    // Decorated headers, echoed inputs and a multi-line reason
    group.bench_function("noisy", |b| b.iter(|| {
        parse_completion(&VALIDATION, black_box(
            "Sure! Here is my assessment.\n\n\
             **Query:** Dyson hair dryer\n\
             **Brand:** Philips\n\
             [[ ## is_consistent ## ]] no\n\
             [[ ## reason ## ]] The query names Dyson,\n\
             but the predicted brand is Philips.\n\
             Both make hair dryers, so category and sub-category are fine."
        ))
    }));

    group.finish();
}

fn bench_prompt_rendering(c: &mut Criterion) {
    let mut group = c.benchmark_group("Prompt rendering");
    group.sample_size(50);

    let invocation = Invocation::new(&VALIDATION)
        .with_input("query", "Compare Samsung and LG smart TVs")
        .with_input("brand", "Samsung")
        .with_input("category", "Electronics")
        .with_input("sub_category", "Smart TVs");
    group.bench_function("validation", |b| b.iter(|| render_prompt(black_box(&invocation))));

    group.finish();
}

fn bench_confidence_check(c: &mut Criterion) {
    let mut group = c.benchmark_group("Confidence check");

    for raw in ["0.82", " 1.7 ", "high", ""] {
        group.bench_function(format!("parse_{:?}", raw), |b| b.iter(|| {
            Confidence::parse(Some(black_box(raw)))
        }));
    }

    let sub_label = Label::parse("Smart TVs");
    group.bench_function("reasons", |b| b.iter(|| {
        clarification_reasons(
            black_box(0.6),
            Confidence::new(0.3),
            &sub_label,
            Confidence::new(0.59),
            false,
        )
    }));

    group.finish();
}

criterion_group!(
    benches,
    bench_completion_parsing,
    bench_prompt_rendering,
    bench_confidence_check
);
criterion_main!(benches);
