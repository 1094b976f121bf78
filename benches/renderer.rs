use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use lto_label::barcode::Code39;
use lto_label::code::Code;
use lto_label::font::LabelFont;
use lto_label::geometry::LabelGeometry;
use lto_label::render::{build_label, encode_png, rasterize, render_svg};
use lto_label::{FontConfig, LabelConfig};
use std::hint::black_box;

const CODES: [&str; 3] = ["CA0001", "CA0001L", "CA0001L6"];

fn bitmap_config() -> LabelConfig {
    LabelConfig {
        font: FontConfig {
            family: "No Such Face 7f3a".to_string(),
            file: None,
        },
        ..LabelConfig::default()
    }
}

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("code39");
    for code in CODES {
        group.bench_with_input(BenchmarkId::from_parameter(code), code, |b, data| {
            b.iter(|| {
                let symbol = Code39::encode(black_box(data)).expect("encode failed");
                black_box(symbol.layout(126.0).bars.len());
            });
        });
    }
    group.finish();
}

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render_svg");
    let config = bitmap_config();
    let font = LabelFont::load(&config.font);
    for code in CODES {
        let code = Code::parse(code).expect("valid code");
        let geometry = LabelGeometry::compute(&code, &config).expect("geometry failed");
        let cells = geometry.cells(&code, &config.palette);
        group.bench_with_input(BenchmarkId::from_parameter(&code), &cells, |b, cells| {
            b.iter(|| {
                let svg = render_svg(&code, &geometry, black_box(cells), &font).expect("render failed");
                black_box(svg.len());
            });
        });
    }
    group.finish();
}

fn bench_end_to_end(c: &mut Criterion) {
    let mut group = c.benchmark_group("end_to_end");
    let config = bitmap_config();
    for dpi in [203u32, 300, 600] {
        let config = LabelConfig { dpi, ..config.clone() };
        group.bench_with_input(BenchmarkId::new("dpi", dpi), &config, |b, config| {
            b.iter(|| {
                let drawing = build_label(black_box("CA0001L6"), config).expect("build failed");
                let pixmap = rasterize(&drawing.svg, &drawing.geometry).expect("rasterize failed");
                let bytes = encode_png(&pixmap, config.dpi).expect("encode failed");
                black_box(bytes.len());
            });
        });
    }
    group.finish();
}

criterion_group!(
    name = benches;
    config = Criterion::default();
    targets = bench_encode, bench_render, bench_end_to_end
);
criterion_main!(benches);
