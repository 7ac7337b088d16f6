use minidom::Element;

const SVG_NS: &str = "svg";
const DEFAULT_SVG_SIZE: &str = "480px";

/// Converts an Android Vector Drawable tree (as decoded by [`AXML`](crate::axml::AXML))
/// into an SVG tree suitable for any SVG rasterizer.
///
/// Holds only the gradient id counter, so a fresh instance per drawable is
/// cheap and keeps ids deterministic across runs.
pub struct VectorXform {
    next_gradient_id: u32,
}

impl Default for VectorXform {
    fn default() -> Self {
        Self::new()
    }
}

impl VectorXform {
    pub fn new() -> Self {
        VectorXform {
            next_gradient_id: 0,
        }
    }

    /// `vector_root` must be the `<vector>` element of a decoded Vector Drawable.
    pub fn transform(&mut self, vector_root: &Element) -> Element {
        let mut defs = Vec::new();
        let mut svg = self.transform_element(vector_root, &mut defs);

        if !defs.is_empty() {
            let mut defs_el = Element::bare("defs", SVG_NS);
            for def in defs {
                defs_el.append_child(def);
            }
            svg.append_child(defs_el);
        }

        svg
    }

    fn local_attrs(el: &Element) -> Vec<(String, String)> {
        el.attrs()
            .map(|(name, value)| {
                let local = name.rsplit(':').next().unwrap_or(name);
                (local.to_owned(), value.to_owned())
            })
            .collect()
    }

    fn transform_element(&mut self, el: &Element, defs: &mut Vec<Element>) -> Element {
        match el.name() {
            "vector" => self.transform_vector(el, defs),
            "group" => self.transform_group(el, defs),
            "path" => Self::transform_path(el),
            "gradient" => self.transform_gradient(el, defs),
            "solid" => Self::transform_solid(el),
            other => {
                let mut out = Element::bare(other, SVG_NS);
                for (name, value) in Self::local_attrs(el) {
                    out.set_attr(name, value);
                }
                for child in el.children() {
                    out.append_child(self.transform_element(child, defs));
                }
                out
            }
        }
    }

    fn transform_vector(&mut self, el: &Element, defs: &mut Vec<Element>) -> Element {
        let attrs = Self::local_attrs(el);
        let get = |name: &str| attrs.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str());

        let width = Self::strip_dp(get("width")).unwrap_or_else(|| DEFAULT_SVG_SIZE.to_owned());
        let height = Self::strip_dp(get("height")).unwrap_or_else(|| DEFAULT_SVG_SIZE.to_owned());

        let mut svg = Element::bare("svg", SVG_NS);
        svg.set_attr("xmlns", "http://www.w3.org/2000/svg");
        svg.set_attr("width", width);
        svg.set_attr("height", height);

        if let (Some(w), Some(h)) = (get("viewportWidth"), get("viewportHeight")) {
            svg.set_attr("viewBox", format!("0 0 {w} {h}"));
        }

        for (name, value) in attrs {
            if matches!(
                name.as_str(),
                "width" | "height" | "viewportWidth" | "viewportHeight"
            ) {
                continue;
            }
            svg.set_attr(name, value);
        }

        for child in el.children() {
            let transformed = self.transform_element(child, defs);
            if child.name() == "gradient" {
                self.attach_gradient_rect(&mut svg, &transformed);
            } else {
                svg.append_child(transformed);
            }
        }

        svg
    }

    fn transform_group(&mut self, el: &Element, defs: &mut Vec<Element>) -> Element {
        let attrs = Self::local_attrs(el);
        let get = |name: &str, default: &str| {
            attrs
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.clone())
                .unwrap_or_else(|| default.to_owned())
        };

        let scale_x = get("scaleX", "1");
        let scale_y = get("scaleY", "1");
        let rotation = get("rotation", "0");
        let pivot_x = get("pivotX", "0");
        let pivot_y = get("pivotY", "0");
        let translate_x = get("translateX", "0");
        let translate_y = get("translateY", "0");

        let mut g = Element::bare("g", SVG_NS);
        g.set_attr(
            "transform",
            format!(
                "scale({scale_x} {scale_y}) rotate({rotation} {pivot_x} {pivot_y}) translate({translate_x} {translate_y})"
            ),
        );

        for (name, value) in attrs {
            if matches!(
                name.as_str(),
                "scaleX"
                    | "scaleY"
                    | "rotation"
                    | "pivotX"
                    | "pivotY"
                    | "translateX"
                    | "translateY"
                    | "name"
            ) {
                continue;
            }
            g.set_attr(name, value);
        }

        for child in el.children() {
            let transformed = self.transform_element(child, defs);
            if child.name() == "gradient" {
                self.attach_gradient_rect(&mut g, &transformed);
            } else {
                g.append_child(transformed);
            }
        }

        g
    }

    fn transform_path(el: &Element) -> Element {
        let attrs = Self::local_attrs(el);
        let mut path = Element::bare("path", SVG_NS);

        for (name, value) in attrs {
            match name.as_str() {
                "pathData" => path.set_attr("d", value),
                "strokeWidth" => path.set_attr("stroke-width", value),
                "strokeColor" => path.set_attr("stroke", value),
                "strokeLinecap" => path.set_attr("stroke-linecap", value),
                "strokeLineJoin" => path.set_attr("stroke-line-join", value),
                "strokeMiterLimit" => path.set_attr("stroke-miter-limit", value),
                "fillAlpha" => path.set_attr("fill-opacity", value),
                "strokeAlpha" => path.set_attr("stroke-opacity", value),
                "fillType" => path.set_attr("fill-rule", value.to_lowercase()),
                "fillColor" => {
                    let (color, opacity) = Self::split_argb(&value);
                    path.set_attr("fill", color);
                    if let Some(opacity) = opacity {
                        path.set_attr("fill-opacity", opacity);
                    }
                }
                "name" => {}
                other => path.set_attr(other, value),
            }
        }

        path
    }

    fn transform_solid(el: &Element) -> Element {
        let attrs = Self::local_attrs(el);
        let mut rect = Element::bare("rect", SVG_NS);
        rect.set_attr("x", "0");
        rect.set_attr("y", "0");
        rect.set_attr("width", "100%");
        rect.set_attr("height", "100%");

        if let Some((_, color)) = attrs.iter().find(|(k, _)| k == "color") {
            let (color, opacity) = Self::split_argb(color);
            rect.set_attr("fill", color);
            if let Some(opacity) = opacity {
                rect.set_attr("fill-opacity", opacity);
            }
        }

        rect
    }

    /// Renders the gradient into a `<linearGradient>`/`<radialGradient>`/`<sweepGradient>`
    /// definition (pushed onto `defs`) and returns that definition element - the caller
    /// is responsible for also emitting the covering `<rect>` via [`attach_gradient_rect`].
    fn transform_gradient(&mut self, el: &Element, defs: &mut Vec<Element>) -> Element {
        let attrs = Self::local_attrs(el);
        let get = |name: &str| attrs.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str());

        let gradient_type: u32 = get("type").and_then(|v| v.parse().ok()).unwrap_or(0);
        let tag = match gradient_type {
            1 => "radialGradient",
            // sweepGradient has no SVG equivalent; fall back to a radial gradient
            // rather than emit a tag no SVG rasterizer understands.
            2 => {
                log::warn!(
                    "sweep gradient has no SVG equivalent, emitting as radialGradient with data-android-gradient=\"sweep\""
                );
                "radialGradient"
            }
            _ => "linearGradient",
        };

        let id = format!("gradient-{}", self.next_gradient_id);
        self.next_gradient_id += 1;

        let mut gradient = Element::bare(tag, SVG_NS);
        gradient.set_attr("id", id.clone());
        if gradient_type == 2 {
            gradient.set_attr("data-android-gradient", "sweep");
        }

        if tag == "linearGradient"
            && let Some(angle) = get("angle").and_then(|v| v.parse::<f64>().ok())
        {
            let radians = angle.to_radians();
            let (dx, dy) = (radians.cos() * 100.0, radians.sin() * 100.0);
            let (x1, x2) = if dx < 0.0 { (-dx, 0.0) } else { (0.0, dx) };
            let (y1, y2) = if dy < 0.0 { (-dy, 0.0) } else { (0.0, dy) };

            gradient.set_attr("x1", format!("{x1}%"));
            gradient.set_attr("y1", format!("{y1}%"));
            gradient.set_attr("x2", format!("{x2}%"));
            gradient.set_attr("y2", format!("{y2}%"));
        }

        let stops = [
            (get("startColor"), "0%"),
            (get("centerColor"), "50%"),
            (get("endColor"), "100%"),
        ];
        for (color, offset) in stops {
            let Some(color) = color else { continue };
            let (color, opacity) = Self::split_argb(color);
            let mut stop = Element::bare("stop", SVG_NS);
            stop.set_attr("offset", offset);
            stop.set_attr("stop-color", color);
            if let Some(opacity) = opacity {
                stop.set_attr("stop-opacity", opacity);
            }
            gradient.append_child(stop);
        }

        for child in el.children().filter(|c| c.name() == "item") {
            let child_attrs = Self::local_attrs(child);
            let mut stop = Element::bare("stop", SVG_NS);
            for (name, value) in child_attrs {
                match name.as_str() {
                    "offset" => stop.set_attr("offset", format!("{}%", percent(&value))),
                    "color" => {
                        let (color, opacity) = Self::split_argb(&value);
                        stop.set_attr("stop-color", color);
                        if let Some(opacity) = opacity {
                            stop.set_attr("stop-opacity", opacity);
                        }
                    }
                    _ => {}
                }
            }
            gradient.append_child(stop);
        }

        let mut id_marker = Element::bare("gradient-ref", SVG_NS);
        id_marker.set_attr("id", id);
        defs.push(gradient);

        id_marker
    }

    /// Gradients (and solids) paint a shape rather than being one, so the
    /// covering `<rect>` is attached to the parent instead of the gradient
    /// definition itself, matching how Vector Drawable `<aapt:attr>` fills work.
    ///
    /// `transformed` here is the marker element returned by [`transform_gradient`],
    /// carrying only the `id` of the definition that was pushed into `defs`.
    fn attach_gradient_rect(&self, parent: &mut Element, transformed: &Element) {
        let Some(id) = transformed.attr("id") else {
            return;
        };

        let mut rect = Element::bare("rect", SVG_NS);
        rect.set_attr("x", "0");
        rect.set_attr("y", "0");
        rect.set_attr("width", "100%");
        rect.set_attr("height", "100%");
        rect.set_attr("style", format!("fill: url(#{id})"));
        parent.append_child(rect);
    }

    fn strip_dp(value: Option<&str>) -> Option<String> {
        value.map(|v| v.replace("dip", "").replace("dp", ""))
    }

    /// Splits a `#AARRGGBB` color into (`#RRGGBB`, `Some(opacity)`). Any other
    /// format (`#RRGGBB`, named color, `@color/...` reference) passes through
    /// unchanged with no opacity.
    fn split_argb(value: &str) -> (String, Option<String>) {
        if value.len() == 9 && value.starts_with('#') {
            if let Ok(alpha) = u8::from_str_radix(&value[1..3], 16) {
                return (
                    format!("#{}", &value[3..]),
                    Some(format!("{:.3}", alpha as f64 / 255.0)),
                );
            }
        }
        (value.to_owned(), None)
    }
}

fn percent(value: &str) -> f64 {
    value.parse::<f64>().unwrap_or(0.0) * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vector_with_child(child: Element) -> Element {
        let mut vector = Element::builder("vector", "android")
            .attr("width", "24dp")
            .attr("height", "24dp")
            .attr("viewportWidth", "24")
            .attr("viewportHeight", "24")
            .build();
        vector.append_child(child);
        vector
    }

    #[test]
    fn vector_becomes_svg_with_viewbox_and_stripped_units() {
        let path = Element::builder("path", "android")
            .attr("pathData", "M0,0L24,24")
            .build();
        let vector = vector_with_child(path);

        let svg = VectorXform::new().transform(&vector);

        assert_eq!(svg.name(), "svg");
        assert_eq!(svg.attr("viewBox"), Some("0 0 24 24"));
        assert_eq!(svg.attr("width"), Some("24"));
        assert_eq!(svg.attr("height"), Some("24"));
        assert_eq!(svg.children().count(), 1);
        assert_eq!(svg.children().next().unwrap().name(), "path");
    }

    #[test]
    fn path_renames_attributes_and_splits_argb_fill() {
        let path = Element::builder("path", "android")
            .attr("pathData", "M0,0L10,10")
            .attr("fillColor", "#80FF0000")
            .attr("strokeWidth", "2")
            .attr("fillType", "EVEN_ODD")
            .build();

        let out = VectorXform::transform_path(&path);

        assert_eq!(out.attr("d"), Some("M0,0L10,10"));
        assert_eq!(out.attr("fill"), Some("#FF0000"));
        assert_eq!(out.attr("fill-opacity"), Some("0.502"));
        assert_eq!(out.attr("stroke-width"), Some("2"));
        assert_eq!(out.attr("fill-rule"), Some("even_odd"));
    }

    #[test]
    fn solid_becomes_full_cover_rect() {
        let solid = Element::builder("solid", "android")
            .attr("color", "#FF112233")
            .build();

        let rect = VectorXform::transform_solid(&solid);

        assert_eq!(rect.name(), "rect");
        assert_eq!(rect.attr("width"), Some("100%"));
        assert_eq!(rect.attr("fill"), Some("#112233"));
        assert_eq!(rect.attr("fill-opacity"), None);
    }

    #[test]
    fn group_composes_transform_in_scale_rotate_translate_order() {
        let group = Element::builder("group", "android")
            .attr("scaleX", "2")
            .attr("scaleY", "2")
            .attr("rotation", "45")
            .attr("pivotX", "12")
            .attr("pivotY", "12")
            .attr("translateX", "5")
            .attr("translateY", "0")
            .build();

        let g = VectorXform::new().transform_group(&group, &mut Vec::new());

        assert_eq!(
            g.attr("transform"),
            Some("scale(2 2) rotate(45 12 12) translate(5 0)")
        );
    }

    #[test]
    fn gradient_is_moved_into_defs_with_a_covering_rect() {
        let gradient = Element::builder("gradient", "android")
            .attr("type", "0")
            .attr("startColor", "#FF000000")
            .attr("endColor", "#FFFFFFFF")
            .build();
        let vector = vector_with_child(gradient);

        let svg = VectorXform::new().transform(&vector);

        let defs = svg.children().find(|c| c.name() == "defs").expect("defs");
        let gradient_def = defs.children().next().expect("gradient definition");
        assert_eq!(gradient_def.name(), "linearGradient");
        assert_eq!(gradient_def.children().count(), 2);

        let rect = svg.children().find(|c| c.name() == "rect").expect("rect");
        let id = gradient_def.attr("id").unwrap();
        assert_eq!(rect.attr("style"), Some(format!("fill: url(#{id})")).as_deref());
    }

    #[test]
    fn gradient_with_negative_angle_component_flips_origin_not_length() {
        let gradient = Element::builder("gradient", "android")
            .attr("type", "0")
            .attr("angle", "180")
            .attr("startColor", "#FF000000")
            .attr("endColor", "#FFFFFFFF")
            .build();

        let mut defs = Vec::new();
        let def = VectorXform::new().transform_gradient(&gradient, &mut defs);

        // angle=180 -> cos=-1, dx=-100: the line should still span the full
        // width, just flipped to start at x1=100% and end at x2=0%.
        assert_eq!(def.attr("x1"), Some("100%"));
        assert_eq!(def.attr("x2"), Some("0%"));
        assert_eq!(def.attr("y1"), Some("0%"));
        assert_ne!(def.attr("x1"), def.attr("x2"));
    }

    #[test]
    fn sweep_gradient_falls_back_to_radial_with_marker_attribute() {
        let gradient = Element::builder("gradient", "android")
            .attr("type", "2")
            .attr("startColor", "#FF000000")
            .attr("endColor", "#FFFFFFFF")
            .build();

        let mut defs = Vec::new();
        let def = VectorXform::new().transform_gradient(&gradient, &mut defs);

        assert_eq!(def.name(), "radialGradient");
        assert_eq!(def.attr("data-android-gradient"), Some("sweep"));
    }

    #[test]
    fn split_argb_passes_through_non_argb_colors() {
        assert_eq!(
            VectorXform::split_argb("@color/accent"),
            ("@color/accent".to_owned(), None)
        );
        assert_eq!(
            VectorXform::split_argb("#112233"),
            ("#112233".to_owned(), None)
        );
    }

    #[test]
    fn split_argb_splits_alpha_channel() {
        let (color, opacity) = VectorXform::split_argb("#FFFFFFFF");
        assert_eq!(color, "#FFFFFF");
        assert_eq!(opacity, Some("1.000".to_owned()));
    }
}
