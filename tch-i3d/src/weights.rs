//! Weights file loading.

use crate::common::*;

/// Load a weights file saved by [nn::VarStore::save] into `vs`.
///
/// Every variable of `vs` must be present in the file with an identical
/// shape. Entries of the file without a matching variable are ignored.
pub fn load_weights(vs: &mut nn::VarStore, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    ensure!(
        path.is_file(),
        "weights file '{}' does not exist",
        path.display()
    );

    let saved: HashMap<String, Tensor> = Tensor::load_multi(path)
        .with_context(|| format!("failed to read weights file '{}'", path.display()))?
        .into_iter()
        .collect();
    let variables = vs.variables();

    let mismatches: Vec<_> = variables
        .iter()
        .filter_map(|(name, var)| match saved.get(name) {
            None => Some(format!("'{}' is missing", name)),
            Some(src) if src.size() != var.size() => Some(format!(
                "'{}' expects shape {:?}, but the file has {:?}",
                name,
                var.size(),
                src.size()
            )),
            Some(_) => None,
        })
        .sorted()
        .collect();
    ensure!(
        mismatches.is_empty(),
        "weights file '{}' does not match the model: {}",
        path.display(),
        mismatches.join(", ")
    );

    let num_unused = saved.len() - variables.len();
    if num_unused > 0 {
        warn!("ignore {} unused entries in '{}'", num_unused, path.display());
    }

    tch::no_grad(|| -> Result<_> {
        for (name, mut var) in variables {
            var.f_copy_(&saved[&name])?;
        }
        Ok(())
    })?;

    info!("loaded weights from '{}'", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::I3dInit;

    #[test]
    fn load_weights_test() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("i3d.ot");

        let src_vs = nn::VarStore::new(Device::Cpu);
        let _model = I3dInit::new(4).build(&src_vs.root()).unwrap();
        src_vs.save(&path).unwrap();

        let mut dst_vs = nn::VarStore::new(Device::Cpu);
        let _model = I3dInit::new(4).build(&dst_vs.root()).unwrap();
        load_weights(&mut dst_vs, &path).unwrap();

        let src = src_vs.variables();
        let dst = dst_vs.variables();
        let name = "logits.conv.weight";
        assert!(src[name].equal(&dst[name]));
    }

    #[test]
    fn shape_mismatch_test() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("i3d.ot");

        let src_vs = nn::VarStore::new(Device::Cpu);
        let _model = I3dInit::new(4).build(&src_vs.root()).unwrap();
        src_vs.save(&path).unwrap();

        let mut dst_vs = nn::VarStore::new(Device::Cpu);
        let _model = I3dInit::new(7).build(&dst_vs.root()).unwrap();
        let err = load_weights(&mut dst_vs, &path).unwrap_err();
        assert!(format!("{}", err).contains("logits.conv.weight"));
    }

    #[test]
    fn missing_file_test() {
        let mut vs = nn::VarStore::new(Device::Cpu);
        let _model = I3dInit::new(4).build(&vs.root()).unwrap();
        assert!(load_weights(&mut vs, "/nonexistent/i3d.ot").is_err());
    }
}
