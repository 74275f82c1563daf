//! SVGKit benchmarks
//!
//! Run with: cargo bench -p svgkit-render

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use svgkit_common::RenderConfig;
use svgkit_geometry::{parse_path_data, point_at_distance, total_path_length};
use svgkit_render::{DisplayList, Renderer};
use svgkit_scene::{Document, DocumentContext, ElementDefinition};

fn path_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("path");

    let curvy = generate_path_data(50);
    group.throughput(Throughput::Bytes(curvy.len() as u64));
    group.bench_with_input(BenchmarkId::new("parse", "50_segments"), &curvy, |b, d| {
        b.iter(|| parse_path_data(d))
    });

    let path = parse_path_data(&curvy);
    group.bench_function("total_length", |b| b.iter(|| total_path_length(&path)));

    let half = total_path_length(&path) / 2.0;
    group.bench_function("point_at_distance", |b| b.iter(|| point_at_distance(half, &path)));

    group.finish();
}

fn document_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("document");

    for n in [10, 100, 1000] {
        let definition = generate_document(n);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::new("build", n), &definition, |b, definition| {
            b.iter(|| Document::from_definition(definition, RenderConfig::default()))
        });
    }

    group.finish();
}

fn render_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");

    for n in [10, 100, 1000] {
        let definition = generate_document(n);
        let Ok(document) = Document::from_definition(&definition, RenderConfig::default()) else {
            continue;
        };
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::new("display_list", n), &document, |b, document| {
            let renderer = Renderer::default();
            b.iter(|| {
                let mut list = DisplayList::new();
                let mut context = DocumentContext::new(document);
                renderer.render(document, &mut list, &mut context);
                list
            })
        });
    }

    group.finish();
}

fn generate_path_data(n: usize) -> String {
    let mut d = String::from("M0,0");
    for i in 0..n {
        let x = (i * 10) as f32;
        d.push_str(&format!(" C{},{} {},{} {},0", x + 3.0, 20.0, x + 7.0, -20.0, x + 10.0));
    }
    d
}

fn generate_document(n: usize) -> ElementDefinition {
    let gradient = ElementDefinition::new("linearGradient")
        .attr("id", "fade")
        .child(ElementDefinition::new("stop").attr("offset", "0").attr("stop-color", "red"))
        .child(ElementDefinition::new("stop").attr("offset", "1").attr("stop-color", "blue"));
    let mut root = ElementDefinition::new("svg")
        .attr("width", "800")
        .attr("height", "600")
        .child(ElementDefinition::new("defs").child(gradient));
    for i in 0..n {
        let shape = ElementDefinition::new("rect")
            .attr("id", format!("r{i}"))
            .attr("x", format!("{}", i % 80 * 10))
            .attr("y", format!("{}", i / 80 * 10))
            .attr("width", "8")
            .attr("height", "8")
            .attr("fill", if i % 3 == 0 { "url(#fade)" } else { "teal" })
            .attr("stroke", "black");
        root = root.child(ElementDefinition::new("g").attr("transform", "rotate(1)").child(shape));
    }
    root
}

criterion_group!(benches, path_benchmarks, document_benchmarks, render_benchmarks);

criterion_main!(benches);
