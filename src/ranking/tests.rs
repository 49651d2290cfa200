use super::*;
use crate::batch::{ChannelResult, GroupResult};
use proptest::prelude::*;

fn link(url: &str) -> Channel {
    Channel::new("CCTV-1", url, None, "test").expect("valid channel")
}

fn results(buckets: Vec<(&str, &str, Vec<&str>)>) -> AggregateResults {
    let mut aggregate = AggregateResults::new();
    for (group, channel, urls) in buckets {
        let bucket = ChannelResult::new(channel, urls.into_iter().map(link).collect());
        match aggregate.groups_mut().iter_mut().find(|g| g.name == group) {
            Some(existing) => existing.channels.push(bucket),
            None => aggregate.push_group(GroupResult::new(group, vec![bucket])),
        }
    }
    aggregate
}

fn urls(channels: &[Channel]) -> Vec<&str> {
    channels.iter().map(|c| c.url()).collect()
}

#[test]
fn test_extract_host_key_ipv4_verbatim() {
    assert_eq!(extract_host_key("http://1.2.3.4:8080/live.m3u8"), "1.2.3.4");
}

#[test]
fn test_extract_host_key_hostname() {
    assert_eq!(extract_host_key("https://cdn.example.com/a/b.m3u8"), "cdn.example.com");
    assert_eq!(extract_host_key("rtmp://live.example.net/app/stream"), "live.example.net");
}

#[test]
fn test_extract_host_key_ipv6_literal() {
    assert_eq!(
        extract_host_key("http://[2409:8087::1]:6610/live"),
        "[2409:8087::1]"
    );
}

#[test]
fn test_extract_host_key_falls_back_to_raw_url() {
    assert_eq!(extract_host_key("not a url"), "not a url");
}

#[test]
fn test_collect_counts_across_all_buckets() {
    let aggregate = results(vec![
        ("News", "CCTV-1", vec!["http://a.example/1.m3u8", "http://b.example/1.m3u8"]),
        ("News", "CCTV-2", vec!["http://a.example/2.m3u8"]),
        ("Local", "BTV", vec!["http://a.example/3.m3u8", "http://c.example/3.m3u8"]),
    ]);
    let frequency = DomainFrequency::collect(&aggregate);
    assert_eq!(frequency.len(), 3);
    assert_eq!(frequency.frequency("a.example"), 3);
    assert_eq!(frequency.frequency("b.example"), 1);
    assert_eq!(frequency.frequency("missing.example"), 0);
    assert_eq!(frequency.top(1), vec![("a.example", 3)]);
}

#[test]
fn test_frequent_host_sorts_first_regardless_of_input_order() {
    let mut aggregate = results(vec![
        ("News", "CCTV-1", vec!["http://b.example/1.m3u8", "http://a.example/1.m3u8"]),
        ("News", "CCTV-2", vec!["http://a.example/2.m3u8"]),
        ("News", "CCTV-3", vec!["http://a.example/3.m3u8"]),
    ]);
    let frequency = DomainFrequency::collect(&aggregate);
    frequency.rank_results(&mut aggregate);

    let cctv1 = aggregate.get("News", "CCTV-1").expect("bucket");
    assert_eq!(
        urls(cctv1),
        vec!["http://a.example/1.m3u8", "http://b.example/1.m3u8"]
    );
}

#[test]
fn test_ties_break_on_host_name_then_input_order() {
    let mut links = vec![
        link("http://z.example/1.m3u8"),
        link("http://m.example/1.m3u8"),
        link("http://m.example/2.m3u8"),
        link("http://a.example/1.m3u8"),
    ];
    let frequency = DomainFrequency::default();
    frequency.sort_channels(&mut links);
    assert_eq!(
        urls(&links),
        vec![
            "http://a.example/1.m3u8",
            "http://m.example/1.m3u8",
            "http://m.example/2.m3u8",
            "http://z.example/1.m3u8",
        ]
    );
}

#[test]
fn test_ranking_is_per_bucket() {
    let mut aggregate = results(vec![
        ("News", "CCTV-1", vec!["http://b.example/1.m3u8"]),
        ("News", "CCTV-2", vec!["http://a.example/2.m3u8"]),
    ]);
    let frequency = DomainFrequency::collect(&aggregate);
    frequency.rank_results(&mut aggregate);

    assert_eq!(
        urls(aggregate.get("News", "CCTV-1").expect("bucket")),
        vec!["http://b.example/1.m3u8"]
    );
    assert_eq!(
        urls(aggregate.get("News", "CCTV-2").expect("bucket")),
        vec!["http://a.example/2.m3u8"]
    );
}

proptest! {
    #[test]
    fn test_ranking_is_independent_of_input_order(
        hosts in prop::collection::vec(0u8..4, 1..12),
        seed in any::<u64>()
    ) {
        let build = |order: &[usize]| -> Vec<Channel> {
            order
                .iter()
                .map(|&i| link(&format!("http://h{}.example/{}.m3u8", hosts[i], i)))
                .collect()
        };
        let forward: Vec<usize> = (0..hosts.len()).collect();
        let mut shuffled = forward.clone();
        let len = shuffled.len();
        shuffled.rotate_left((seed as usize) % len);

        let mut counts = HashMap::new();
        for h in &hosts {
            *counts.entry(format!("h{}.example", h)).or_insert(0usize) += 1;
        }
        let frequency = DomainFrequency { counts };

        let mut a = build(&forward);
        let mut b = build(&shuffled);
        frequency.sort_channels(&mut a);
        frequency.sort_channels(&mut b);

        let hosts_a: Vec<String> = a.iter().map(|c| extract_host_key(c.url())).collect();
        let hosts_b: Vec<String> = b.iter().map(|c| extract_host_key(c.url())).collect();
        prop_assert_eq!(hosts_a, hosts_b);
    }
}
