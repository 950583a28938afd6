//! Write-path throughput on the in-memory backend, serial and parallel.

use std::sync::Arc;

use secrecy::SecretString;

use plop_cas::Store;
use plop_storage::MemoryBackend;

fn make_data(size: usize, seed: &[u8]) -> Vec<u8> {
    let mut data = vec![0u8; size];
    blake3::Hasher::new()
        .update(seed)
        .finalize_xof()
        .fill(&mut data);
    data
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .unwrap()
}

fn bench_store() -> Arc<Store> {
    Arc::new(Store::new(Arc::new(MemoryBackend::new()), &SecretString::from("bench")).unwrap())
}

#[divan::bench(args = [1048576, 16777216])]
fn create_serial(bencher: divan::Bencher, size: usize) {
    let rt = runtime();
    let store = bench_store();
    let data = make_data(size, b"serial");
    bencher
        .counter(divan::counter::BytesCount::new(size))
        .bench(|| rt.block_on(store.put(divan::black_box(&data))).unwrap());
}

#[divan::bench(args = [2, 8])]
fn create_parallel(bencher: divan::Bencher, tasks: usize) {
    const SIZE: usize = 4 * 1024 * 1024;

    let rt = runtime();
    let store = bench_store();
    let payloads: Vec<Arc<Vec<u8>>> = (0..tasks)
        .map(|i| Arc::new(make_data(SIZE, &[i as u8])))
        .collect();

    bencher
        .counter(divan::counter::BytesCount::new(SIZE * tasks))
        .bench(|| {
            rt.block_on(async {
                let handles: Vec<_> = payloads
                    .iter()
                    .map(|payload| {
                        let store = Arc::clone(&store);
                        let payload = Arc::clone(payload);
                        tokio::spawn(async move { store.put(&payload).await.unwrap() })
                    })
                    .collect();
                for handle in handles {
                    handle.await.unwrap();
                }
            })
        });
}

#[divan::bench(args = [16777216])]
fn open_read_all(bencher: divan::Bencher, size: usize) {
    let rt = runtime();
    let store = bench_store();
    let data = make_data(size, b"read");
    let root = rt.block_on(store.put(&data)).unwrap();

    bencher
        .counter(divan::counter::BytesCount::new(size))
        .bench(|| {
            rt.block_on(async {
                let handle = store.open(divan::black_box(&root)).await.unwrap();
                handle.read_all().await.unwrap()
            })
        });
}

fn main() {
    divan::main();
}
