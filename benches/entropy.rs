//! Entropy coding benchmarks: symbol generation, table building and bit output.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use jfif_encoder::bitstream::VecBitWriter;
use jfif_encoder::consts::DCTSIZE2;
use jfif_encoder::dct::transform_block;
use jfif_encoder::entropy::{DcPredictor, EntropyEncoder, ScanSymbols};
use jfif_encoder::huffman::{std_ac_luma, std_dc_luma, CodeTable, TableClass};
use jfif_encoder::quant::{luma_table, quantize_block};
use jfif_encoder::sample::Plane;
use jfif_encoder::zigzag::to_zigzag;

/// Quantized zig-zag blocks of a noisy gradient.
fn generate_realistic_blocks(width: usize, height: usize, quality: u8) -> Vec<[i16; DCTSIZE2]> {
    let data = (0..width * height)
        .map(|i| {
            let (x, y) = (i % width, i / width);
            ((x * 200 / width + y * 50 / height) as u8).saturating_add(((x * 7 + y * 13) % 40) as u8)
        })
        .collect();
    let plane = Plane::new(width, height, data);
    let table = luma_table(quality);

    let mut blocks = Vec::with_capacity((width / 8) * (height / 8));
    for by in 0..height / 8 {
        for bx in 0..width / 8 {
            let coeffs = transform_block(&plane.read_block(bx, by));
            blocks.push(to_zigzag(&quantize_block(&coeffs, &table)));
        }
    }
    blocks
}

fn build_scan(blocks: &[[i16; DCTSIZE2]]) -> ScanSymbols {
    let mut scan = ScanSymbols::with_block_capacity(blocks.len());
    let mut predictor = DcPredictor::new();
    for block in blocks {
        predictor = scan.push_block(block, 0, predictor);
    }
    scan
}

fn write_scan(scan: &ScanSymbols, tables: &[(CodeTable, CodeTable)]) -> Vec<u8> {
    let mut writer = VecBitWriter::new_vec();
    {
        let mut encoder = EntropyEncoder::new(&mut writer);
        encoder.encode_scan(scan, tables).unwrap();
        encoder.finish().unwrap();
    }
    writer.into_bytes()
}

fn entropy_benchmark(c: &mut Criterion) {
    let standard = vec![(
        CodeTable::from_huffman_table(&std_dc_luma(), TableClass::Dc).unwrap(),
        CodeTable::from_huffman_table(&std_ac_luma(), TableClass::Ac).unwrap(),
    )];

    let mut group = c.benchmark_group("entropy_512x512");

    for quality in [50u8, 85, 95] {
        let blocks = generate_realistic_blocks(512, 512, quality);
        let scan = build_scan(&blocks);
        let name = format!("Q{}", quality);
        group.throughput(Throughput::Elements(blocks.len() as u64));

        group.bench_with_input(BenchmarkId::new("symbols", &name), &blocks, |b, blocks| {
            b.iter(|| build_scan(black_box(blocks)))
        });

        group.bench_with_input(BenchmarkId::new("optimal_tables", &name), &scan, |b, scan| {
            b.iter(|| {
                let freq = scan.frequencies(1);
                (
                    freq[0].0.generate_table().unwrap(),
                    freq[0].1.generate_table().unwrap(),
                )
            })
        });

        group.bench_with_input(BenchmarkId::new("write_standard", &name), &scan, |b, scan| {
            b.iter(|| write_scan(black_box(scan), &standard))
        });
    }

    group.finish();
}

criterion_group!(benches, entropy_benchmark);
criterion_main!(benches);
