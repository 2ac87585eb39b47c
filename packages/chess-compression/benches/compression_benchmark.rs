// benches/compression_benchmark.rs
use chess_compression::{compress_game, compress_pgn, decompress_game, Encoder};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

const GAME: &str = "e4 c5 Nf3 d6 Bb5+ Bd7 Bxd7+ Nxd7 O-O Ngf6 Re1 e6 d4 cxd4 Nxd4 Be7 c4 a6 \
    Nc3 O-O Be3 Rc8 b3 e5 Nf5 b5 Nxd6 Bxd6 Qxd6 bxc4 b4 a5 a3 Re8 Rad1 Re6 Qd2 Rb8 Bg5 Qb6 \
    Be3 Qb7 f3 axb4 axb4 Qxb4 Rb1 Qd6 Rxb8+ Qxb8 Rb1 Qc7 Nd5 Nxd5 exd5 Rd6 f4 c3 Qc2 Rxd5 \
    fxe5 Nxe5 Qxc3 h6";

fn compression_benchmark(c: &mut Criterion) {
    let moves: Vec<&str> = GAME.split_whitespace().collect();
    let compressed = compress_game(&moves).unwrap();

    c.bench_function("compress_game", |b| {
        b.iter(|| compress_game(black_box(&moves)))
    });
    c.bench_function("decompress_game", |b| {
        b.iter(|| decompress_game(black_box(&compressed), moves.len()))
    });

    let mut encoder = Encoder::new();
    c.bench_function("encode_reused_encoder", |b| {
        b.iter(|| encoder.encode(black_box(&moves)))
    });
    c.bench_function("compress_pgn", |b| b.iter(|| compress_pgn(black_box(&moves))));
}

criterion_group!(benches, compression_benchmark);
criterion_main!(benches);
