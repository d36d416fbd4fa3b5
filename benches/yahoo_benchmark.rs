use criterion::{criterion_group, criterion_main, Criterion};
use fantasy_sports_api::services::{trade, yahoo_xml};
use std::hint::black_box;

/// A waiver-wire page of `count` players, shaped like Yahoo's response.
fn waiver_page(count: usize) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<fantasy_content xmlns="http://fantasysports.yahooapis.com/fantasy/v2/base.rng">
<league><league_key>423.l.12345</league_key><players>"#,
    );
    for i in 0..count {
        xml.push_str(&format!(
            r#"<player>
  <player_key>423.p.{i}</player_key><player_id>{i}</player_id>
  <name><full>Player {i}</full><first>Player</first><last>{i}</last></name>
  <editorial_team_abbr>SF</editorial_team_abbr>
  <display_position>WR</display_position>
  <headshot><url>https://s.yimg.com/headshots/{i}.png</url></headshot>
  <eligible_positions><position>WR</position><position>W/R/T</position></eligible_positions>
  <percent_owned><coverage_type>week</coverage_type><value>{pct}</value></percent_owned>
</player>"#,
            pct = i % 100
        ));
    }
    xml.push_str("</players></league></fantasy_content>");
    xml
}

fn benchmark_waiver_parsing(c: &mut Criterion) {
    let page = waiver_page(25);
    let large = waiver_page(500);

    let mut group = c.benchmark_group("waiver_wire_parsing");

    group.bench_function("page_of_25", |b| {
        b.iter(|| yahoo_xml::parse_waiver_players(black_box(&page)))
    });

    group.bench_function("page_of_500", |b| {
        b.iter(|| yahoo_xml::parse_waiver_players(black_box(&large)))
    });

    group.finish();
}

fn benchmark_recommendation(c: &mut Criterion) {
    c.bench_function("trade_recommend", |b| {
        b.iter(|| {
            for their in (0..20_000).step_by(250) {
                black_box(trade::recommend(black_box(10_000), their));
            }
        })
    });
}

criterion_group!(benches, benchmark_waiver_parsing, benchmark_recommendation);
criterion_main!(benches);
