use plop_crypto::{KeySchedule, SharingSecret, PREFIX_BLOB};

fn make_data(size: usize) -> Vec<u8> {
    (0..size)
        .map(|i| (i.wrapping_mul(7) ^ (i >> 3)) as u8)
        .collect()
}

fn bench_schedule() -> KeySchedule {
    KeySchedule::derive(&SharingSecret::from_bytes([42u8; 32])).unwrap()
}

#[divan::bench(args = [1024, 65536, 1048576])]
fn bench_seal(bencher: divan::Bencher, size: usize) {
    let keys = bench_schedule();
    let data = make_data(size);
    bencher
        .counter(divan::counter::BytesCount::new(size))
        .bench(|| keys.seal(PREFIX_BLOB, divan::black_box(&data)).unwrap());
}

#[divan::bench(args = [1024, 65536, 1048576])]
fn bench_open(bencher: divan::Bencher, size: usize) {
    let keys = bench_schedule();
    let data = make_data(size);
    let sealed = keys.seal(PREFIX_BLOB, &data).unwrap();
    bencher
        .counter(divan::counter::BytesCount::new(size))
        .bench(|| {
            keys.open(
                PREFIX_BLOB,
                divan::black_box(&sealed.hash),
                divan::black_box(&sealed.ciphertext),
            )
            .unwrap()
        });
}

fn main() {
    divan::main();
}
