use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use active_text_core::{CustomPatternConfig, ElementKind, ScanSettings, TextRange};
use active_text_scanner::{ElementExtractor, FilterSet, PatternMatcher};

const PARAGRAPH: &str = "Shipping notes from @release.bot: see https://example.com/changelog/2024/very/long/path \
and www.docs.example.org/guide for details. Ping @ann or mail ops@example.com #release #infra TICKET-42. ";

/// Build a text of `n` paragraphs.
fn create_text(n: usize) -> String {
    PARAGRAPH.repeat(n)
}

fn all_kinds() -> ScanSettings {
    ScanSettings {
        enabled_kinds: vec![
            ElementKind::Mention,
            ElementKind::Hashtag,
            ElementKind::Url,
            ElementKind::Email,
            ElementKind::custom("ticket"),
        ],
        url_max_length: Some(24),
        custom_patterns: vec![CustomPatternConfig::new("ticket", r"TICKET-\d+")],
    }
}

fn bench_full_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_scan");
    let extractor = ElementExtractor::new();
    let settings = all_kinds();
    let filters = FilterSet::new();

    for paragraphs in [1, 10, 100].iter() {
        let text = create_text(*paragraphs);

        group.bench_with_input(
            BenchmarkId::from_parameter(paragraphs),
            &text,
            |b, t| {
                b.iter(|| {
                    let output = extractor.scan(black_box(t), &settings, &filters);
                    black_box(output)
                });
            },
        );
    }

    group.finish();
}

fn bench_url_truncation(c: &mut Criterion) {
    let extractor = ElementExtractor::new();
    let text = create_text(10);
    let range = TextRange::full(text.encode_utf16().count());

    c.bench_function("url_truncation", |b| {
        b.iter(|| {
            let extraction = extractor.extract_url_elements(black_box(&text), range, Some(16));
            black_box(extraction)
        });
    });
}

fn bench_mention_pattern(c: &mut Criterion) {
    let matcher = PatternMatcher::new();
    let text = create_text(10);
    let range = TextRange::full(text.encode_utf16().count());

    c.bench_function("mention_pattern", |b| {
        b.iter(|| {
            let matches = matcher.find_matches(
                active_text_scanner::pattern::MENTION_PATTERN,
                black_box(&text),
                range,
            );
            black_box(matches)
        });
    });
}

criterion_group!(
    benches,
    bench_full_scan,
    bench_url_truncation,
    bench_mention_pattern
);
criterion_main!(benches);
