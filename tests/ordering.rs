mod common;
use common::{decode_all, serializer};
use ironpush::{Mutation, Payload};
use std::collections::BTreeSet;

#[test]
fn test_single_and_broadcast_scenario() {
  let mut s = serializer(false);
  let m1 = Mutation::set(b"k1".to_vec(), b"v1".to_vec());
  let m2 = Mutation::set(b"k2".to_vec(), b"v2".to_vec());

  s.write_message(m1.clone(), &"T1").unwrap();
  let teams: BTreeSet<_> = ["T1", "T2"].into_iter().collect();
  s.broadcast_message(m2.clone(), &teams).unwrap();

  let decoded = decode_all(&mut s);
  assert_eq!(decoded.len(), 2);

  let t1 = &decoded["T1"];
  assert_eq!(t1.len(), 2);
  assert_eq!((t1[0].sequence, &t1[0].payload), (0, &Payload::Mutation(m1)));
  assert_eq!((t1[1].sequence, &t1[1].payload), (1, &Payload::Mutation(m2.clone())));

  let t2 = &decoded["T2"];
  assert_eq!(t2.len(), 1);
  assert_eq!((t2[0].sequence, &t2[0].payload), (1, &Payload::Mutation(m2)));
}

#[test]
fn test_single_writes_strictly_increase() {
  let mut s = serializer(false);
  let teams = ["a", "b", "c"];

  let mut issued = Vec::new();
  for i in 0..30 {
    let team = teams[i % 3];
    issued.push(s.write_message(format!("m{}", i).into_bytes(), &team).unwrap());
  }

  assert!(issued.windows(2).all(|w| w[0] < w[1]));

  // Each shard sees its own numbers in order.
  let decoded = decode_all(&mut s);
  for items in decoded.values() {
    assert!(items.windows(2).all(|w| w[0].sequence < w[1].sequence));
  }

  let mut all: Vec<u64> = decoded.values().flatten().map(|i| i.sequence).collect();
  all.sort_unstable();
  assert_eq!(all, issued);
}

#[test]
fn test_broadcast_number_exceeds_all_previous() {
  let mut s = serializer(false);
  s.write_message(b"x".as_slice(), &"a").unwrap();
  s.write_message(b"y".as_slice(), &"b").unwrap();
  s.write_message(b"z".as_slice(), &"d").unwrap();

  let teams: BTreeSet<_> = ["a", "b", "c"].into_iter().collect();
  let shared = s.broadcast_message(b"all".as_slice(), &teams).unwrap();
  assert_eq!(shared, 3);

  let decoded = decode_all(&mut s);
  for team in &teams {
    let last = decoded[team].last().unwrap();
    assert_eq!(last.sequence, shared);
    assert_eq!(last.payload, Payload::Raw(b"all".to_vec()));
  }
  assert!(decoded["d"].iter().all(|i| i.sequence < shared));

  // The next write lands after the broadcast.
  assert_eq!(s.current_sequence(), shared + 1);
}

#[test]
fn test_broadcast_copies_are_independent() {
  let mut s = serializer(false);
  let teams: BTreeSet<_> = ["a", "b"].into_iter().collect();
  s.broadcast_message(vec![1u8, 2, 3], &teams).unwrap();
  s.write_message(vec![9u8], &"a").unwrap();

  let blobs = s.get_all_serialized().unwrap();
  assert_ne!(blobs["a"].len(), blobs["b"].len());

  let (_, b_items) = ironpush::deserialize(&blobs["b"]).unwrap();
  assert_eq!(b_items.len(), 1);
  assert_eq!(b_items[0].payload, Payload::Raw(vec![1, 2, 3]));
}
