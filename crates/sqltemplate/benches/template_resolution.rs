//! Template Resolution Performance Benchmarks
//!
//! Measures placeholder resolution, nesting depth and statement generators

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use elif_sqltemplate::{
    EngineConfig, EntityDescriptor, FieldDescriptor, MethodDescriptor, ParameterDescriptor,
    ParameterStyle, SemanticType, SqlDialect, TemplateContext, TemplateEngine,
};
use once_cell::sync::Lazy;

static ENTITY: Lazy<EntityDescriptor> = Lazy::new(|| {
    EntityDescriptor::new("Order")
        .with_field(FieldDescriptor::new("Id", SemanticType::Int64).primary_key())
        .with_field(FieldDescriptor::new("CustomerId", SemanticType::Int64))
        .with_field(FieldDescriptor::new("Status", SemanticType::String))
        .with_field(FieldDescriptor::new("Total", SemanticType::Decimal))
        .with_field(FieldDescriptor::new("Notes", SemanticType::Text).nullable())
        .with_field(FieldDescriptor::new("CreatedAt", SemanticType::DateTime))
});

static METHOD: Lazy<MethodDescriptor> = Lazy::new(|| {
    MethodDescriptor::new("FindByStatus")
        .with_parameter(ParameterDescriptor::new("status", SemanticType::String))
});

fn bench_basic_templates(c: &mut Criterion) {
    let mut group = c.benchmark_group("basic_templates");
    let engine = TemplateEngine::default();
    let ctx = TemplateContext::new(&ENTITY, &METHOD, "Orders", SqlDialect::PostgreSql);

    group.bench_function("no_placeholders", |b| {
        b.iter(|| engine.process(black_box("SELECT id FROM orders WHERE id = @id"), &ctx))
    });

    group.bench_function("simple_select", |b| {
        b.iter(|| engine.process(black_box("SELECT {{columns}} FROM {{table}} {{where:auto}}"), &ctx))
    });

    group.bench_function("paginated_select", |b| {
        let template = "SELECT {{columns --exclude Notes}} FROM {{table}} \
                        {{where:auto}} {{orderby CreatedAt --desc}} {{paginate}}";
        b.iter(|| engine.process(black_box(template), &ctx))
    });

    group.finish();
}

fn bench_nesting_depth(c: &mut Criterion) {
    let mut group = c.benchmark_group("nesting_depth");
    let engine = TemplateEngine::default();
    let ctx = TemplateContext::new(&ENTITY, &METHOD, "Orders", SqlDialect::SqlServer);

    let templates = [
        (1, "SELECT {{avg total}} FROM {{table}}"),
        (2, "SELECT {{round {{avg total}}, 2}} FROM {{table}}"),
        (3, "SELECT {{coalesce {{round {{avg total}}, 2}}, 0}} FROM {{table}}"),
    ];

    for (depth, template) in templates {
        group.bench_with_input(BenchmarkId::new("depth", depth), template, |b, template| {
            b.iter(|| engine.process(black_box(template), &ctx))
        });
    }

    group.finish();
}

fn bench_statement_generators(c: &mut Criterion) {
    let mut group = c.benchmark_group("statement_generators");
    let engine = TemplateEngine::default();

    for dialect in SqlDialect::ALL {
        let ctx = TemplateContext::new(&ENTITY, &METHOD, "Orders", dialect);
        group.bench_with_input(BenchmarkId::new("upsert", dialect), &ctx, |b, ctx| {
            b.iter(|| engine.process(black_box("{{upsert --exclude CreatedAt}}"), ctx))
        });
    }

    let ctx = TemplateContext::new(&ENTITY, &METHOD, "Orders", SqlDialect::MySql);
    for size in [10, 100, 1000] {
        let template = format!("{{{{batch_insert {} --exclude Id}}}}", size);
        group.bench_with_input(BenchmarkId::new("batch_insert", size), &template, |b, template| {
            b.iter(|| engine.process(black_box(template), &ctx))
        });
    }

    group.finish();
}

fn bench_parameter_styles(c: &mut Criterion) {
    let mut group = c.benchmark_group("parameter_styles");
    let template = "UPDATE {{table}} SET {{set}} {{where}}";

    for style in [ParameterStyle::Named, ParameterStyle::Positional, ParameterStyle::Numbered] {
        let engine = TemplateEngine::new(
            EngineConfig::default().with_parameter_style(SqlDialect::PostgreSql, style),
        );
        let ctx = TemplateContext::new(&ENTITY, &METHOD, "Orders", SqlDialect::PostgreSql);
        group.bench_with_input(
            BenchmarkId::new("update", format!("{:?}", style)),
            &engine,
            |b, engine| b.iter(|| engine.process(black_box(template), &ctx)),
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_basic_templates,
    bench_nesting_depth,
    bench_statement_generators,
    bench_parameter_styles
);
criterion_main!(benches);
