/// `estPerThreadBytes = tileW*tileH*maxDepthBytes*pipelineDepthFactor` (§4.2).
pub fn estimated_bytes_per_thread(tile_width: u32, tile_height: u32, max_depth_bytes: u32, pipeline_depth_factor: u32) -> u64 {
    u64::from(tile_width) * u64::from(tile_height) * u64::from(max_depth_bytes) * u64::from(pipeline_depth_factor)
}

/// `threads = clamp(freeRAM / estPerThreadBytes, 1, cpuCores)` (§4.2).
pub fn thread_count(free_ram_bytes: u64, estimated_bytes_per_thread: u64, cpu_cores: usize) -> usize {
    let by_memory = if estimated_bytes_per_thread == 0 { cpu_cores as u64 } else { free_ram_bytes / estimated_bytes_per_thread };
    by_memory.clamp(1, cpu_cores as u64) as usize
}
